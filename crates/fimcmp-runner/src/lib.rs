//! # fimcmp-runner
//!
//! In-process pipeline around the closed itemset miner: parses FIMI-style
//! transaction text, ranks items by frequency, builds the TID index one
//! partition at a time, merges the partitions and mines the result.
//!
//! ## Quick Start
//!
//! ```rust
//! use fimcmp_runner::{mine_closed, RunConfig};
//!
//! let text = "\
//! bread milk
//! bread diapers beer eggs
//! milk diapers beer cola
//! bread milk diapers beer
//! bread milk diapers cola
//! ";
//!
//! let config = RunConfig::builder()
//!     .with_min_support_ratio(0.6)
//!     .with_num_partitions(2)
//!     .build();
//! let report = mine_closed(text, &config)?;
//!
//! for itemset in &report.itemsets {
//!     println!("{:?} ({})", itemset.items, itemset.support);
//! }
//! assert_eq!(report.min_support_count, 3);
//! # Ok::<(), fimcmp_runner::RunnerError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - Builds partitions and mines tasks with rayon
//! - `serde` - Serialize/Deserialize for [`RunConfig`] and [`LabelledItemset`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod config;
mod error;
pub mod parse;
pub mod pipeline;
pub mod substrate;

// Public re-exports
pub use config::{MinSupport, RunConfig, RunConfigBuilder};
pub use error::{RunnerError, RunnerResult};
pub use parse::parse_transactions;
pub use pipeline::{
    count_closed, mine_closed, mine_transactions, prepare, LabelledItemset, MiningReport,
    PhaseTimings, PreparedInput,
};
pub use substrate::{build_and_merge, partition_with_tids, TidRow};
