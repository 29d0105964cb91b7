//! Proof-of-Traffic scoring.
//!
//! Each candidate's raw score is its total packet count, scaled by a factor
//! in `[RANDOM_FACTOR_MIN, RANDOM_FACTOR_MAX]` and divided by the chain
//! difficulty, then truncated to an integer. The highest score wins; ties
//! go to the first candidate in registry (address) order.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

use super::{RANDOM_FACTOR_MAX, RANDOM_FACTOR_MIN};
use crate::traffic::{TrafficRegistry, TrafficSample};

/// Where the per-candidate randomization factor comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Independent uniform draw per candidate from the thread RNG.
    #[default]
    Local,
    /// Derived from the registry contents and previous block hash, so any
    /// observer with the same inputs recomputes the same winner.
    Seeded,
}

impl FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "seeded" => Ok(Self::Seeded),
            other => Err(format!("unknown scoring mode '{other}'")),
        }
    }
}

/// A scored registry entry; the best one is the round's winner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub address: String,
    pub sample: TrafficSample,
    pub score: u64,
}

/// `(packets_in + packets_out) * factor / difficulty`, truncated toward zero.
pub fn score(sample: &TrafficSample, factor: f64, difficulty: u32) -> u64 {
    let scaled = sample.total() as f64 * factor / f64::from(difficulty.max(1));
    scaled as u64
}

pub fn local_factor<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(RANDOM_FACTOR_MIN..=RANDOM_FACTOR_MAX)
}

/// Seed for one round: SHA-256 of the canonical registry and the hash of
/// the block the round builds on.
pub fn round_seed(registry: &TrafficRegistry, prev_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(registry.canonical_json().as_bytes());
    hasher.update(b"|");
    hasher.update(prev_hash.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn seeded_factor(seed: &str, address: &str) -> f64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(b"|");
    hasher.update(address.as_bytes());
    let digest = hasher.finalize();

    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    let unit = u64::from_be_bytes(word) as f64 / u64::MAX as f64;
    RANDOM_FACTOR_MIN + unit * (RANDOM_FACTOR_MAX - RANDOM_FACTOR_MIN)
}

/// Score every registry entry, in address order.
pub fn rank<F>(registry: &TrafficRegistry, difficulty: u32, mut factor: F) -> Vec<Candidate>
where
    F: FnMut(&str) -> f64,
{
    registry
        .iter()
        .map(|(address, sample)| Candidate {
            address: address.clone(),
            sample: *sample,
            score: score(sample, factor(address), difficulty),
        })
        .collect()
}

/// Highest score wins; on equal scores the earlier candidate is kept.
pub fn select_winner(candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates.into_iter().fold(None, |best, c| match best {
        Some(b) if b.score >= c.score => Some(b),
        _ => Some(c),
    })
}
