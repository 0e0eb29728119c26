//! Root construction and sequential prefix expansion.
//!
//! Root creation is the son spawn of the empty itemset: every frequent item
//! becomes a son candidate whose diffset is the TIDs missing the item.
//! Candidates are queued from the least frequent rank down to rank 0, so the
//! first root drained has every other item as a right sibling and rank 0 has
//! none.

use log::debug;

use crate::accumulator::ResultAccumulator;
use crate::miner::{MiningContext, SubtreeMiner};
use crate::nodeset::WorkingNode;
use crate::stats::MiningStats;

/// Builds the empty-itemset node whose sons are the root candidates.
///
/// Items present in every transaction are not roots: they become equivalent
/// items of the empty itemset and are inherited by every root.
pub fn create_roots(ctx: &MiningContext<'_>) -> WorkingNode {
    let candidates = (0..ctx.num_ranks() as u32)
        .rev()
        .filter(|&rank| ctx.item_support(rank) >= ctx.min_support())
        .map(|rank| (rank, ctx.item_coverage(rank)));
    let root = WorkingNode::empty_itemset(ctx.total_tids(), candidates);
    debug!(
        "created {} roots ({} items in every transaction)",
        root.sons().count(),
        root.own_equivalents().len()
    );
    root
}

/// Expands the first `prefix_len - 1` levels below the roots sequentially
/// and returns the spawned nodes at depth `prefix_len` as task roots.
///
/// Itemsets emitted during the expansion go to `acc`.
pub fn expand_prefix<A: ResultAccumulator>(
    ctx: &MiningContext<'_>,
    prefix_len: usize,
    acc: &mut A,
) -> (Vec<WorkingNode>, MiningStats) {
    let mut miner = SubtreeMiner::new(ctx);
    let tasks = miner.run(create_roots(ctx), Some(prefix_len), acc);
    let stats = miner.into_stats();
    debug!(
        "expanded prefix of length {}: {} tasks, {} closed itemsets emitted",
        prefix_len,
        tasks.len(),
        stats.closed_emitted
    );
    (tasks, stats)
}
