use chrono::TimeDelta;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::blockchain::{DEFAULT_DIFFICULTY, LinkPolicy};
use crate::consensus::{ConsensusConfig, MINT_INTERVAL_SECS, ScoringMode, TOKEN_REWARD_AMOUNT};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

/// Node settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub node_address: Option<String>,
    pub difficulty: u32,
    pub mint_interval_secs: i64,
    pub tick_interval_secs: u64,
    pub reward_amount: f64,
    pub link_policy: LinkPolicy,
    pub scoring: ScoringMode,
    pub simulate_traffic: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            node_address: None,
            difficulty: DEFAULT_DIFFICULTY,
            mint_interval_secs: MINT_INTERVAL_SECS,
            tick_interval_secs: 1,
            reward_amount: TOKEN_REWARD_AMOUNT,
            link_policy: LinkPolicy::Strict,
            scoring: ScoringMode::Local,
            simulate_traffic: false,
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let strict = parse_or(&lookup, "STRICT_PREV_HASH", true)?;
        let cfg = Self {
            host: lookup("HOST").unwrap_or(d.host),
            port: parse_or(&lookup, "PORT", d.port)?,
            node_address: lookup("NODE_ADDRESS").filter(|a| !a.trim().is_empty()),
            difficulty: parse_or(&lookup, "POT_DIFFICULTY", d.difficulty)?,
            mint_interval_secs: parse_or(&lookup, "MINT_INTERVAL_SECS", d.mint_interval_secs)?,
            tick_interval_secs: parse_or(&lookup, "TICK_INTERVAL_SECS", d.tick_interval_secs)?,
            reward_amount: parse_or(&lookup, "TOKEN_REWARD_AMOUNT", d.reward_amount)?,
            link_policy: if strict {
                LinkPolicy::Strict
            } else {
                LinkPolicy::Lenient
            },
            scoring: parse_or(&lookup, "SCORING_MODE", d.scoring)?,
            simulate_traffic: parse_or(&lookup, "SIMULATE_TRAFFIC", d.simulate_traffic)?,
        };

        if cfg.difficulty == 0 {
            return Err(ConfigError::NotPositive("POT_DIFFICULTY"));
        }
        if cfg.mint_interval_secs <= 0 {
            return Err(ConfigError::NotPositive("MINT_INTERVAL_SECS"));
        }
        if !cfg.reward_amount.is_finite() || cfg.reward_amount <= 0.0 {
            return Err(ConfigError::NotPositive("TOKEN_REWARD_AMOUNT"));
        }
        if cfg.tick_interval_secs == 0 {
            return Err(ConfigError::NotPositive("TICK_INTERVAL_SECS"));
        }
        Ok(cfg)
    }

    pub fn consensus(&self) -> ConsensusConfig {
        ConsensusConfig {
            mint_interval: TimeDelta::seconds(self.mint_interval_secs),
            reward_amount: self.reward_amount,
            scoring: self.scoring,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
