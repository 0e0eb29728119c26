//! Error types for the mining pipeline.

use fimcmp::FimError;
use fimcmp_fin::FinError;
use thiserror::Error;

/// Errors that can occur while running the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunnerError {
    /// A transaction line could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Description of the error.
        message: String,
    },

    /// Minimum support is not a ratio in (0, 1] or a positive count.
    #[error("invalid minimum support: {0}")]
    InvalidSupport(f64),

    /// The run configuration is not usable.
    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),

    /// No transactions were given.
    #[error("no transactions to mine")]
    EmptyInput,

    /// Error from the miner.
    #[error("mining error: {0}")]
    Fin(#[from] FinError),

    /// Error from the TID-set layer.
    #[error("TID-set error: {0}")]
    Fim(#[from] FimError),
}

/// Result type for pipeline operations.
pub type RunnerResult<T> = std::result::Result<T, RunnerError>;
