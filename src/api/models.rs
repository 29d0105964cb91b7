use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::blockchain::Block;
use crate::consensus::{ConsensusEngine, ScoringMode};
use crate::traffic::{TrafficMeter, TrafficRegistry, TrafficSample};
use crate::transaction::Transaction;

/// Shared application state: the consensus engine (which owns the ledger
/// handle) and the local traffic meter.
pub struct AppState {
    pub engine: Arc<ConsensusEngine>,
    pub meter: Arc<TrafficMeter>,
}

impl AppState {
    pub fn new(engine: Arc<ConsensusEngine>, meter: Arc<TrafficMeter>) -> Self {
        Self { engine, meter }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub difficulty: u32,
    pub chain: &'a [Block],
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: u32,
}

#[derive(Serialize)]
pub struct DifficultyResponse {
    pub difficulty: u32,
}

#[derive(Deserialize)]
pub struct SetDifficultyRequest {
    pub difficulty: u32,
}

/* ---------- TX API Models ---------- */

#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    /// Index of the block this transaction will be included in.
    pub block_index: u64,
}

#[derive(Serialize)]
pub struct PendingResponse<'a> {
    pub size: usize,
    pub transactions: &'a [Transaction],
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: f64,
    pub symbol: &'static str,
}

/* ---------- Consensus / Traffic API Models ---------- */

#[derive(Serialize)]
pub struct ConsensusStatusResponse {
    pub node_address: String,
    pub scoring: ScoringMode,
    pub reward_amount: f64,
    pub mint_interval_secs: i64,
    pub last_mint_time: DateTime<Utc>,
    pub next_mint_at: DateTime<Utc>,
    pub seconds_until_mint: i64,
    pub meter_running: bool,
    pub local_traffic: TrafficSample,
    pub recent_samples: Vec<TrafficSample>,
    pub registry: TrafficRegistry,
}

#[derive(Deserialize)]
pub struct PeerTrafficRequest {
    pub node_address: String,
    pub packets_in: u64,
    pub packets_out: u64,
}

#[derive(Deserialize)]
pub struct LocalTrafficRequest {
    pub packets_in: u64,
    pub packets_out: u64,
}

#[derive(Serialize)]
pub struct TrafficAck {
    pub node_address: String,
    pub sample: TrafficSample,
}

#[derive(Serialize)]
pub struct IdentityResponse {
    pub address: String,
    pub uri: String,
    pub balance: f64,
    pub symbol: &'static str,
}
