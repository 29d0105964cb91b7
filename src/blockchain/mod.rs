pub mod block;
pub mod error;
pub mod model;

pub use block::Block;
pub use error::LedgerError;
pub use model::{Ledger, LinkPolicy};

pub const TOKEN_NAME: &str = "Sniffing-Packeting";
pub const TOKEN_SYMBOL: &str = "$@SNFZ@$";

/// prev_hash of the genesis block, and the fallback when the chain is empty.
pub const GENESIS_PREV_HASH: &str = "1";

/// Fixed nonce stamped on the genesis block.
pub const GENESIS_NONCE: u64 = 100;

/// Reserved sender of reward transactions (not a real node).
pub const BLOCK_REWARD_SENDER: &str = "BLOCK_REWARD";

/// Default PoT difficulty: divisor applied to every candidate score.
pub const DEFAULT_DIFFICULTY: u32 = 2;
