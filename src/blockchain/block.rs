use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{GENESIS_NONCE, GENESIS_PREV_HASH};
use crate::traffic::TrafficSample;
use crate::transaction::Transaction;

/// A block of the PoT ledger. `traffic_data` records the winning sample
/// of the round that minted it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: i64, // Unix timestamp in milliseconds (UTC)
    pub transactions: Vec<Transaction>,
    pub prev_hash: String,
    pub traffic_data: TrafficSample,
    pub nonce: u64,   // cosmetic, not a proof-of-work
    pub hash: String, // Cached hash of the block
}

impl Block {
    /// The sentinel first block: index 1, fixed marker and nonce, zero traffic.
    pub fn genesis() -> Self {
        Self::new(
            1,
            Vec::new(),
            GENESIS_PREV_HASH.to_string(),
            TrafficSample::zero(),
            GENESIS_NONCE,
        )
    }

    /// Build a block stamped with the current time and cache its hash.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        prev_hash: String,
        traffic_data: TrafficSample,
        nonce: u64,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp: Utc::now().timestamp_millis(),
            transactions,
            prev_hash,
            traffic_data,
            nonce,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// SHA-256 over every field except `hash`. The preimage is a JSON
    /// object whose keys serialize in sorted order, so the digest does
    /// not depend on struct field order.
    pub fn compute_hash(&self) -> String {
        let preimage = serde_json::json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "transactions": self.transactions,
            "prev_hash": self.prev_hash,
            "traffic_data": self.traffic_data,
            "nonce": self.nonce,
        });
        let mut hasher = Sha256::new();
        hasher.update(preimage.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Cached hash still matches the content.
    pub fn is_valid(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 1
            && self.prev_hash == GENESIS_PREV_HASH
            && self.nonce == GENESIS_NONCE
            && self.traffic_data == TrafficSample::zero()
            && self.transactions.is_empty()
    }
}
