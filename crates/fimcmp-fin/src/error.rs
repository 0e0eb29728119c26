//! Error types for closed-itemset mining.

use fimcmp::{FimError, Rank};
use thiserror::Error;

/// Errors that can occur before or while mining.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FinError {
    /// The miner configuration is not usable.
    #[error("Invalid miner configuration: {0}")]
    InvalidConfig(String),

    /// An item's coverage does not fit the declared TID domain.
    #[error("Coverage of rank {rank} reaches TID {actual}, but only {expected} transactions exist")]
    CoverageMismatch {
        /// The offending rank.
        rank: Rank,
        /// Declared number of transactions.
        expected: u64,
        /// Largest TID found in the coverage.
        actual: u64,
    },

    /// Error from the TID-set layer.
    #[error("TID-set error: {0}")]
    Fim(#[from] FimError),
}

/// Result type for mining operations.
pub type FinResult<T> = std::result::Result<T, FinError>;
