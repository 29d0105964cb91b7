pub mod driver;
pub mod engine;
pub mod scoring;

pub use engine::{ConsensusConfig, ConsensusEngine};
pub use scoring::{Candidate, ScoringMode};

/// Seconds between reward blocks.
pub const MINT_INTERVAL_SECS: i64 = 300;

/// Tokens paid to the winner of each round.
pub const TOKEN_REWARD_AMOUNT: f64 = 1000.0;

/// Bounds of the per-candidate randomization factor.
pub const RANDOM_FACTOR_MIN: f64 = 0.95;
pub const RANDOM_FACTOR_MAX: f64 = 1.05;

/// Nonces stamped on reward blocks are drawn from this range.
pub const REWARD_NONCE_MIN: u64 = 1;
pub const REWARD_NONCE_MAX: u64 = 1_000_000;
