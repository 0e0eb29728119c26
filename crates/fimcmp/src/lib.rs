//! # fimcmp
//!
//! Transaction-id (TID) bitsets for frequent and closed itemset mining.
//!
//! This crate provides:
//! - **Bitword algebra** ([`bits`]): word-packed set/get/cardinality/min/max,
//!   ascending decode, and ranged AND/OR over `u64` words with an explicit
//!   base offset.
//! - **Partition TID index** ([`tidset`]): one TID bitset per item rank for
//!   each data partition, plus an associative, commutative merge that costs
//!   O(word count) because partition TID ranges are disjoint.
//! - **Rank encoding** ([`ranks`]): dense ranks for frequent item labels,
//!   ordered by descending frequency.
//!
//! ## Usage
//!
//! ```rust
//! use fimcmp::tidset::PartitionTidIndex;
//!
//! // two partitions of rank-encoded transactions, tagged with global TIDs
//! let part0 = vec![(vec![0u32, 1, 2], 0u64), (vec![0, 1], 1)];
//! let part1 = vec![(vec![0u32, 2], 2u64), (vec![1, 2], 3)];
//!
//! let index = PartitionTidIndex::build_partition(&part0, 3)?
//!     .merge(PartitionTidIndex::build_partition(&part1, 3)?)?;
//!
//! assert_eq!(index.supports(), vec![3, 3, 3]);
//! assert_eq!(index.get(2).unwrap().tids(), vec![0, 2, 3]);
//! # Ok::<(), fimcmp::FimError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Serialize/Deserialize for [`tidset::TidRange`] and
//!   [`tidset::TidSetSummary`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bits;
mod error;
pub mod ranks;
pub mod tidset;

pub use bits::TidBits;
pub use error::{FimError, FimResult};
pub use ranks::RankEncoder;
pub use tidset::{PartitionTidIndex, PartitionTidSet, TidRange, TidSetSummary};

/// Dense id of a frequent item; rank 0 is the most frequent.
pub type Rank = u32;

/// Dense, globally unique transaction id in `[0, total_transactions)`.
pub type Tid = u64;

/// Number of transactions containing an itemset.
pub type SupportCount = u64;
