//! # fimcmp-fin
//!
//! Closed frequent itemset mining in the FIN+ style: a depth-first
//! enumeration tree over difference-sets, with pre/post order codes for
//! ancestor tests.
//!
//! ## Key Features
//!
//! - **Difference-sets** - each tree node stores the TIDs its item removes
//!   from the parent, so support is `support(parent) - |diffset|`
//! - **Equivalent-item folding** - siblings with identical coverage are
//!   merged into the label instead of spawning duplicate subtrees
//! - **Closure checks** - non-closed itemsets are never emitted
//! - **Task parallelism** - enable the `parallel` feature to mine task roots
//!   with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use fimcmp_fin::{FinConfig, FinMiner, MiningInput};
//!
//! // rank-encoded transactions; rank 0 is the most frequent item
//! let input = MiningInput::from_transactions(
//!     &[vec![0, 1, 2], vec![0, 1], vec![0, 2], vec![1, 2]],
//!     3,
//!     2,
//! )?;
//!
//! let config = FinConfig::builder().with_root_prefix_len(1).build();
//! let closed = FinMiner::with_config(config).mine_collect(&input)?;
//!
//! assert_eq!(closed.len(), 6);
//! assert_eq!(closed[0].items, vec![0]);
//! assert_eq!(closed[0].support, 3);
//! # Ok::<(), fimcmp_fin::FinError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - Mines task roots in parallel using rayon
//! - `serde` - Serialize/Deserialize for [`ClosedItemset`] and [`FinConfig`]
//!
//! ## Architecture
//!
//! ```text
//! MiningInput (coverage per rank)
//!   └── roots::create_roots      empty itemset → one son candidate per item
//!       └── roots::expand_prefix sequential levels 1..k-1 → task roots
//!           └── SubtreeMiner     explicit-stack DFS per task
//!               ├── WorkingNode::spawn   diffsets, pruning, equivalents
//!               ├── closure check        PpcRegistry + item scan
//!               └── ResultAccumulator    add_closed_itemset / unite_with
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod accumulator;
mod config;
mod error;
pub mod miner;
pub mod nodeset;
pub mod ppc;
pub mod roots;
mod stats;

// Public re-exports
pub use accumulator::{ClosedItemset, ClosedItemsetCollector, CountingAccumulator, ResultAccumulator};
pub use config::{FinConfig, FinConfigBuilder};
pub use error::{FinError, FinResult};
pub use miner::{FinMiner, MiningContext, MiningInput, MiningOutcome, SubtreeMiner};
pub use nodeset::{SonCandidate, SpawnOutcome, WorkingNode};
pub use ppc::{PpcNode, PpcRegistry, RegisteredNode};
pub use stats::MiningStats;
