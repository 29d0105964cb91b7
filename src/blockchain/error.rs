use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("chain is empty: genesis block has not been created")]
    EmptyChain,

    #[error("prev_hash mismatch: expected {expected}, supplied {supplied}")]
    IntegrityMismatch { expected: String, supplied: String },

    #[error("difficulty must be a positive integer")]
    InvalidDifficulty,
}
