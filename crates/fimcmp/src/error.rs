//! Error types for TID-set construction.

use thiserror::Error;

use crate::{Rank, Tid};

/// Errors that can occur while building or re-basing TID-sets.
///
/// Merge precondition violations (overlapping partition ranges, rank
/// mismatches) are not represented here: they indicate an upstream
/// partitioning defect and panic instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FimError {
    /// A bit-vector or TID domain would not fit the addressable width.
    #[error("capacity exceeded for {what}: {requested} is not addressable")]
    CapacityExceeded {
        /// What was being sized.
        what: &'static str,
        /// The requested size or index.
        requested: u64,
    },

    /// A transaction id fell outside the partition range it was built for.
    #[error("TID {tid} outside partition range [{min}, {max}]")]
    TidOutOfRange {
        /// The offending TID.
        tid: Tid,
        /// Lower bound of the range (inclusive).
        min: Tid,
        /// Upper bound of the range (inclusive).
        max: Tid,
    },

    /// A rank was not below the declared total rank count.
    #[error("rank {rank} out of range (total ranks: {total})")]
    RankOutOfRange {
        /// The offending rank.
        rank: Rank,
        /// Declared number of ranks.
        total: usize,
    },
}

/// Result type for TID-set operations.
pub type FimResult<T> = std::result::Result<T, FimError>;
