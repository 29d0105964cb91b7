use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};
use rand::Rng;
use std::sync::{Arc, Mutex};

use super::scoring::{self, Candidate, ScoringMode};
use super::{MINT_INTERVAL_SECS, REWARD_NONCE_MAX, REWARD_NONCE_MIN, TOKEN_REWARD_AMOUNT};
use crate::blockchain::{GENESIS_PREV_HASH, Ledger, LedgerError, TOKEN_SYMBOL};
use crate::traffic::{TrafficRegistry, TrafficSample};
use crate::transaction::Transaction;

#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    pub mint_interval: TimeDelta,
    pub reward_amount: f64,
    pub scoring: ScoringMode,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            mint_interval: TimeDelta::seconds(MINT_INTERVAL_SECS),
            reward_amount: TOKEN_REWARD_AMOUNT,
            scoring: ScoringMode::Local,
        }
    }
}

/// Proof-of-Traffic round runner and reward minter.
///
/// The registry is written by peer registrations and by each round's
/// self-registration; both go through the same mutex. `last_mint_time` is
/// held for the whole of `try_mint_block_at` so two overlapping ticks can
/// never mint twice for one interval.
pub struct ConsensusEngine {
    ledger: Arc<Mutex<Ledger>>,
    registry: Mutex<TrafficRegistry>,
    last_mint_time: Mutex<DateTime<Utc>>,
    node_address: String,
    config: ConsensusConfig,
}

impl ConsensusEngine {
    pub fn new(
        ledger: Arc<Mutex<Ledger>>,
        node_address: impl Into<String>,
        config: ConsensusConfig,
    ) -> Self {
        Self::with_start_time(ledger, node_address, config, Utc::now())
    }

    /// Like `new`, with the mint timer starting at `started_at`.
    pub fn with_start_time(
        ledger: Arc<Mutex<Ledger>>,
        node_address: impl Into<String>,
        config: ConsensusConfig,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ledger,
            registry: Mutex::new(TrafficRegistry::new()),
            last_mint_time: Mutex::new(started_at),
            node_address: node_address.into(),
            config,
        }
    }

    pub fn node_address(&self) -> &str {
        &self.node_address
    }

    pub fn ledger(&self) -> &Arc<Mutex<Ledger>> {
        &self.ledger
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Overwrite the latest sample reported by `node_address`.
    pub fn register_traffic(&self, node_address: impl Into<String>, sample: TrafficSample) {
        let node_address = node_address.into();
        debug!(
            "traffic registered for {node_address}: in={} out={}",
            sample.packets_in, sample.packets_out
        );
        let mut registry = self.registry.lock().expect("mutex poisoned");
        registry.register(node_address, sample);
    }

    pub fn registry_snapshot(&self) -> TrafficRegistry {
        self.registry.lock().expect("mutex poisoned").clone()
    }

    /// Register `own_sample` for this node, score every registry entry with
    /// the configured factor source and return the best candidate.
    pub fn determine_winner(&self, own_sample: TrafficSample) -> Option<Candidate> {
        match self.config.scoring {
            ScoringMode::Local => {
                let mut rng = rand::thread_rng();
                self.determine_winner_with(own_sample, |_, _| scoring::local_factor(&mut rng))
            }
            ScoringMode::Seeded => self.determine_winner_with(own_sample, scoring::seeded_factor),
        }
    }

    /// `determine_winner` with an explicit factor source, called as
    /// `factor(round_seed, address)`.
    pub fn determine_winner_with<F>(
        &self,
        own_sample: TrafficSample,
        mut factor: F,
    ) -> Option<Candidate>
    where
        F: FnMut(&str, &str) -> f64,
    {
        let (difficulty, prev_hash) = {
            let ledger = self.ledger.lock().expect("mutex poisoned");
            let prev_hash = ledger
                .last_block()
                .map(|b| b.compute_hash())
                .unwrap_or_else(|_| GENESIS_PREV_HASH.to_string());
            (ledger.difficulty(), prev_hash)
        };

        let ranked = {
            let mut registry = self.registry.lock().expect("mutex poisoned");
            registry.register(self.node_address.clone(), own_sample);
            let seed = scoring::round_seed(&registry, &prev_hash);
            scoring::rank(&registry, difficulty, |address| factor(&seed, address))
        };
        debug!("PoT round scored {} candidates", ranked.len());

        scoring::select_winner(ranked)
    }

    pub fn last_mint_time(&self) -> DateTime<Utc> {
        *self.last_mint_time.lock().expect("mutex poisoned")
    }

    pub fn next_mint_at(&self) -> DateTime<Utc> {
        self.last_mint_time() + self.config.mint_interval
    }

    /// Whole seconds left before the next mint, clamped at zero.
    pub fn seconds_until_mint(&self, now: DateTime<Utc>) -> i64 {
        (self.next_mint_at() - now).num_seconds().max(0)
    }

    pub fn is_mint_due(&self, now: DateTime<Utc>) -> bool {
        now - self.last_mint_time() >= self.config.mint_interval
    }

    pub fn try_mint_block(&self, own_sample: TrafficSample) -> Result<bool, LedgerError> {
        self.try_mint_block_at(own_sample, Utc::now())
    }

    /// Mint a reward block if the interval has elapsed as of `now`.
    ///
    /// Returns `Ok(false)` without side effects while the interval is
    /// running, and also when a round finds no candidate; in the latter case
    /// the timer is not reset so the next tick retries.
    pub fn try_mint_block_at(
        &self,
        own_sample: TrafficSample,
        now: DateTime<Utc>,
    ) -> Result<bool, LedgerError> {
        let mut last_mint = self.last_mint_time.lock().expect("mutex poisoned");
        if now - *last_mint < self.config.mint_interval {
            return Ok(false);
        }

        info!("[{TOKEN_SYMBOL}] mint interval reached, running PoT round");
        let Some(winner) = self.determine_winner(own_sample) else {
            warn!("PoT round found no candidates; retrying next tick");
            return Ok(false);
        };

        let mut ledger = self.ledger.lock().expect("mutex poisoned");
        ledger.push_transaction(Transaction::reward(
            winner.address.as_str(),
            self.config.reward_amount,
        ));
        let prev_hash = ledger.last_block()?.compute_hash();
        let nonce = rand::thread_rng().gen_range(REWARD_NONCE_MIN..=REWARD_NONCE_MAX);
        let block = ledger.new_block(nonce, Some(&prev_hash), winner.sample)?;

        info!(
            "[{TOKEN_SYMBOL}] block #{} minted, winner {} (score {}) received {}",
            block.index, winner.address, winner.score, self.config.reward_amount
        );
        *last_mint = now;
        Ok(true)
    }

    /// Balance of `address`, replayed by the ledger.
    pub fn get_balance(&self, address: &str) -> f64 {
        self.ledger
            .lock()
            .expect("mutex poisoned")
            .get_balance(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{BLOCK_REWARD_SENDER, LinkPolicy};

    const NODE: &str = "local-node";

    fn engine_with(difficulty: u32, scoring: ScoringMode, t0: DateTime<Utc>) -> ConsensusEngine {
        let ledger = Ledger::new(difficulty, LinkPolicy::Strict).unwrap();
        let config = ConsensusConfig {
            scoring,
            ..ConsensusConfig::default()
        };
        ConsensusEngine::with_start_time(Arc::new(Mutex::new(ledger)), NODE, config, t0)
    }

    fn interval() -> TimeDelta {
        TimeDelta::seconds(MINT_INTERVAL_SECS)
    }

    fn chain_len(engine: &ConsensusEngine) -> usize {
        engine.ledger().lock().unwrap().len()
    }

    #[test]
    fn register_traffic_overwrites_entry() {
        let engine = engine_with(1, ScoringMode::Local, Utc::now());
        engine.register_traffic("peer", TrafficSample::new(10, 10));
        engine.register_traffic("peer", TrafficSample::new(1, 1));
        let snapshot = engine.registry_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("peer"), Some(&TrafficSample::new(1, 1)));
    }

    #[test]
    fn determine_winner_registers_own_sample() {
        let engine = engine_with(1, ScoringMode::Local, Utc::now());
        engine.determine_winner(TrafficSample::new(3, 4)).unwrap();
        engine.determine_winner(TrafficSample::new(5, 6)).unwrap();
        let snapshot = engine.registry_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(NODE), Some(&TrafficSample::new(5, 6)));
    }

    #[test]
    fn heavier_peer_wins_every_round() {
        let engine = engine_with(1, ScoringMode::Local, Utc::now());
        engine.register_traffic("peer", TrafficSample::new(50, 50));
        for _ in 0..500 {
            let winner = engine.determine_winner(TrafficSample::new(1, 0)).unwrap();
            assert_eq!(winner.address, "peer");
            assert_eq!(winner.sample, TrafficSample::new(50, 50));
        }
    }

    #[test]
    fn equal_scores_resolve_to_first_address() {
        let engine = engine_with(1, ScoringMode::Local, Utc::now());
        engine.register_traffic("a-peer", TrafficSample::new(10, 0));
        let winner = engine
            .determine_winner_with(TrafficSample::new(5, 5), |_, _| 1.0)
            .unwrap();
        assert_eq!(winner.address, "a-peer");
        assert_eq!(winner.score, 10);
    }

    #[test]
    fn winner_is_the_top_ranked_candidate() {
        let engine = engine_with(2, ScoringMode::Local, Utc::now());
        engine.register_traffic("peer", TrafficSample::new(30, 10));
        let winner = engine
            .determine_winner_with(TrafficSample::new(1, 1), |_, _| 1.0)
            .unwrap();
        let ranked = scoring::rank(&engine.registry_snapshot(), 2, |_| 1.0);
        assert_eq!(ranked.len(), 2);
        assert_eq!(
            winner,
            Candidate {
                address: "peer".into(),
                sample: TrafficSample::new(30, 10),
                score: 20,
            }
        );
        assert_eq!(scoring::select_winner(ranked), Some(winner));
    }

    #[test]
    fn seeded_rounds_are_reproducible() {
        let engine = engine_with(1, ScoringMode::Seeded, Utc::now());
        engine.register_traffic("peer-1", TrafficSample::new(100, 100));
        engine.register_traffic("peer-2", TrafficSample::new(99, 101));
        let own = TrafficSample::new(100, 99);
        let first = engine.determine_winner(own).unwrap();
        for _ in 0..10 {
            assert_eq!(engine.determine_winner(own).unwrap(), first);
        }
    }

    #[test]
    fn mint_gate_follows_interval() {
        let t0 = Utc::now();
        let engine = engine_with(1, ScoringMode::Local, t0);
        let sample = TrafficSample::new(1, 1);

        assert!(!engine.try_mint_block_at(sample, t0).unwrap());
        assert!(
            !engine
                .try_mint_block_at(sample, t0 + interval() - TimeDelta::seconds(1))
                .unwrap()
        );
        assert_eq!(chain_len(&engine), 1);

        let t1 = t0 + interval();
        assert!(engine.try_mint_block_at(sample, t1).unwrap());
        assert_eq!(chain_len(&engine), 2);
        assert_eq!(engine.last_mint_time(), t1);

        assert!(!engine.try_mint_block_at(sample, t1 + TimeDelta::seconds(10)).unwrap());
        assert_eq!(chain_len(&engine), 2);

        assert!(
            engine
                .try_mint_block_at(sample, t1 + interval() + TimeDelta::seconds(3))
                .unwrap()
        );
        assert_eq!(chain_len(&engine), 3);
    }

    #[test]
    fn single_node_scenario_pays_reward() {
        let t0 = Utc::now();
        let engine = engine_with(2, ScoringMode::Local, t0);
        let sample = TrafficSample::new(50, 50);

        assert!(engine.try_mint_block_at(sample, t0 + interval()).unwrap());

        let ledger = engine.ledger().lock().unwrap();
        let block = ledger.last_block().unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.traffic_data, sample);
        assert_eq!(block.transactions.len(), 1);
        let reward = &block.transactions[0];
        assert_eq!(reward.sender, BLOCK_REWARD_SENDER);
        assert_eq!(reward.recipient, NODE);
        assert_eq!(reward.amount, TOKEN_REWARD_AMOUNT);
        assert!((REWARD_NONCE_MIN..=REWARD_NONCE_MAX).contains(&block.nonce));
        assert_eq!(block.prev_hash, ledger.chain()[0].hash);
        assert!(ledger.is_valid_chain());
        drop(ledger);

        assert_eq!(engine.get_balance(NODE), TOKEN_REWARD_AMOUNT);
    }

    #[test]
    fn balance_accumulates_over_rewards() {
        let t0 = Utc::now();
        let engine = engine_with(1, ScoringMode::Local, t0);
        let rounds = 4;
        for n in 1..=rounds {
            let now = t0 + interval() * n;
            assert!(engine.try_mint_block_at(TrafficSample::new(7, 7), now).unwrap());
        }
        assert_eq!(engine.get_balance(NODE), f64::from(rounds) * TOKEN_REWARD_AMOUNT);
        assert_eq!(engine.get_balance("stranger"), 0.0);
    }

    #[test]
    fn pending_transfers_ride_along_with_reward() {
        let t0 = Utc::now();
        let engine = engine_with(1, ScoringMode::Local, t0);
        engine
            .ledger()
            .lock()
            .unwrap()
            .new_transaction("alice", "bob", 5.0);

        assert!(engine.try_mint_block_at(TrafficSample::new(1, 1), t0 + interval()).unwrap());
        let ledger = engine.ledger().lock().unwrap();
        let txs = &ledger.last_block().unwrap().transactions;
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].recipient, "bob");
        assert!(txs[1].is_reward());
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn countdown_is_clamped() {
        let t0 = Utc::now();
        let engine = engine_with(1, ScoringMode::Local, t0);
        assert_eq!(engine.next_mint_at(), t0 + interval());
        assert_eq!(engine.seconds_until_mint(t0), MINT_INTERVAL_SECS);
        assert_eq!(engine.seconds_until_mint(t0 + interval() * 2), 0);
        assert!(!engine.is_mint_due(t0));
        assert!(engine.is_mint_due(t0 + interval()));
    }
}
