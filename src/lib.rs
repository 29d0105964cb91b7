//! Single-process Proof-of-Traffic ledger node.
//!
//! `blockchain` owns the chain and pending pool, `consensus` scores reported
//! packet throughput and mints reward blocks, `api` exposes both over HTTP.

pub mod api;
pub mod blockchain;
pub mod config;
pub mod consensus;
pub mod traffic;
pub mod transaction;
pub mod wallet;
