use log::{debug, info, warn};

use super::{Block, GENESIS_PREV_HASH, LedgerError, TOKEN_SYMBOL};
use crate::traffic::TrafficSample;
use crate::transaction::Transaction;

/// How `new_block` treats a caller-supplied prev_hash that does not match
/// the hash of the current last block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkPolicy {
    /// Reject the append with `LedgerError::IntegrityMismatch`.
    #[default]
    Strict,
    /// Accept the supplied value verbatim (logged as a warning).
    Lenient,
}

/// In-memory append-only ledger with a pending transaction pool.
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: u32,
    link_policy: LinkPolicy,
}

impl Ledger {
    /// Initialize a new ledger holding only the genesis block.
    pub fn new(difficulty: u32, link_policy: LinkPolicy) -> Result<Self, LedgerError> {
        if difficulty == 0 {
            return Err(LedgerError::InvalidDifficulty);
        }
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
            difficulty,
            link_policy,
        };
        ledger.create_genesis_block();
        Ok(ledger)
    }

    fn create_genesis_block(&mut self) {
        let genesis = Block::genesis();
        info!("[{TOKEN_SYMBOL}] genesis block created: {}", genesis.hash);
        self.chain.push(genesis);
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> Result<&Block, LedgerError> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Queue a transaction for the next block. Returns the index of the
    /// block it will land in.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
    ) -> u64 {
        self.push_transaction(Transaction::new(sender, recipient, amount))
    }

    pub fn push_transaction(&mut self, tx: Transaction) -> u64 {
        let kind = if tx.is_reward() { "reward" } else { "transfer" };
        debug!(
            "pending {kind} {} -> {} ({}) queued, pool size {}",
            tx.sender,
            tx.recipient,
            tx.amount,
            self.pending.len() + 1
        );
        self.pending.push(tx);
        self.chain.last().map_or(0, |b| b.index) + 1
    }

    /// Append a block carrying the whole pending pool.
    ///
    /// An absent or empty `prev_hash` falls back to the last block's hash
    /// (or the genesis marker on an empty chain). A non-empty value that
    /// differs from it is rejected under `LinkPolicy::Strict`; in that case
    /// no block is created and the pool is left untouched. This is the one
    /// exception to "every `new_block` call flushes the pool": only calls
    /// that actually append a block flush it.
    pub fn new_block(
        &mut self,
        nonce: u64,
        prev_hash: Option<&str>,
        traffic_data: TrafficSample,
    ) -> Result<&Block, LedgerError> {
        let expected = self
            .chain
            .last()
            .map_or_else(|| GENESIS_PREV_HASH.to_string(), |b| b.compute_hash());

        let prev_hash = match prev_hash.filter(|h| !h.is_empty()) {
            None => expected,
            Some(supplied) if supplied == expected => expected,
            Some(supplied) => match self.link_policy {
                LinkPolicy::Strict => {
                    warn!("rejected block append: prev_hash {supplied} != {expected}");
                    return Err(LedgerError::IntegrityMismatch {
                        expected,
                        supplied: supplied.to_string(),
                    });
                }
                LinkPolicy::Lenient => {
                    warn!("accepting mismatched prev_hash {supplied} (expected {expected})");
                    supplied.to_string()
                }
            },
        };

        let index = self.chain.len() as u64 + 1;
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::new(index, transactions, prev_hash, traffic_data, nonce);
        debug!(
            "appended block #{} ({} txs, hash={})",
            block.index,
            block.transactions.len(),
            block.hash
        );
        self.chain.push(block);
        self.last_block()
    }

    /// Replay every transaction in the chain. Unknown addresses yield 0.
    pub fn get_balance(&self, address: &str) -> f64 {
        self.chain
            .iter()
            .flat_map(|b| b.transactions.iter())
            .map(|tx| tx.delta_for(address))
            .sum()
    }

    /// Validate the entire chain: genesis, index contiguity, cached hashes
    /// and prev_hash linkage.
    pub fn is_valid_chain(&self) -> bool {
        let Some(genesis) = self.chain.first() else {
            return false;
        };
        if !genesis.is_genesis() || !genesis.is_valid() {
            return false;
        }

        self.chain.windows(2).enumerate().all(|(i, pair)| {
            let (prev, current) = (&pair[0], &pair[1]);
            current.index == i as u64 + 2 && current.prev_hash == prev.hash && current.is_valid()
        })
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false once constructed: genesis is created in `new`.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: u32) -> Result<(), LedgerError> {
        if difficulty == 0 {
            return Err(LedgerError::InvalidDifficulty);
        }
        self.difficulty = difficulty;
        Ok(())
    }
}
