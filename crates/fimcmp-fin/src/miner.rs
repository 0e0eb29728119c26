//! Closed-itemset mining over difference-sets.
//!
//! The tree is walked depth-first with an explicit stack of
//! [`WorkingNode`]s. Each step pops one son from the node on top of the
//! stack, spawns it against its right siblings, decides whether its itemset
//! is closed, and pushes it. A node is popped once its sons are drained and
//! receives its postorder code at that point.
//!
//! A spawned node is *not closed* when an item outside its label occurs in
//! every transaction of its coverage. Two checks establish this:
//!
//! 1. nodes already emitted in the task with the same support and the same
//!    coverage fingerprint (ancestors skipped by order code) whose label
//!    items outside the candidate's label all cover it;
//! 2. a scan of the remaining frequent items whose support is high enough.
//!
//! The first check is a shortcut and the second is exact. The scan cannot be
//! dropped: registries are per task and keep only the current path's
//! neighbourhood, so a covering itemset emitted in another root's task, or
//! in an already discarded subtree, is invisible to the registry.
//!
//! Non-closed nodes are never emitted but still expand: their sons can be
//! closed under a different path.

use log::{debug, trace};
#[cfg(not(feature = "parallel"))]
use log::warn;

use fimcmp::{FimError, PartitionTidIndex, Rank, SupportCount, TidBits};

use crate::accumulator::{ClosedItemset, ClosedItemsetCollector, ResultAccumulator};
use crate::config::FinConfig;
use crate::error::{FinError, FinResult};
use crate::nodeset::WorkingNode;
use crate::ppc::{PpcNode, PpcRegistry};
use crate::roots;
use crate::stats::MiningStats;

/// Everything the miner reads: item coverage indexed by rank.
///
/// Rank 0 must be the most frequent item.
#[derive(Debug, Clone)]
pub struct MiningInput {
    /// Number of transactions; TIDs are `0..total_tids`.
    pub total_tids: u64,
    /// Minimum number of transactions an itemset must occur in.
    pub min_support_count: SupportCount,
    /// TIDs of each item, indexed by rank.
    pub coverage: Vec<TidBits>,
}

impl MiningInput {
    /// Creates an input from prepared coverage.
    pub fn new(total_tids: u64, min_support_count: SupportCount, coverage: Vec<TidBits>) -> Self {
        Self {
            total_tids,
            min_support_count,
            coverage,
        }
    }

    /// Re-bases a merged partition index onto `[0, total_tids)`.
    ///
    /// # Errors
    ///
    /// Returns [`FinError::Fim`] if a TID-set does not fit the domain.
    pub fn from_index(
        index: PartitionTidIndex,
        total_tids: u64,
        min_support_count: SupportCount,
    ) -> FinResult<Self> {
        let coverage = index.into_coverage(total_tids)?;
        Ok(Self::new(total_tids, min_support_count, coverage))
    }

    /// Builds coverage directly from rank-encoded transactions; TIDs are
    /// positions in `transactions`.
    ///
    /// # Errors
    ///
    /// - [`FimError::RankOutOfRange`] for a rank `>= num_ranks`
    /// - [`FimError::CapacityExceeded`] if there are more transactions than
    ///   `u32` TIDs can address
    pub fn from_transactions<T: AsRef<[Rank]>>(
        transactions: &[T],
        num_ranks: usize,
        min_support_count: SupportCount,
    ) -> FinResult<Self> {
        let total = u32::try_from(transactions.len()).map_err(|_| FimError::CapacityExceeded {
            what: "transaction count",
            requested: transactions.len() as u64,
        })?;
        let mut coverage = vec![TidBits::with_capacity(transactions.len()); num_ranks];
        for (tid, ranks) in (0..total).zip(transactions) {
            for &rank in ranks.as_ref() {
                coverage
                    .get_mut(rank as usize)
                    .ok_or(FimError::RankOutOfRange {
                        rank,
                        total: num_ranks,
                    })?
                    .insert(tid);
            }
        }
        Ok(Self::new(u64::from(total), min_support_count, coverage))
    }

    /// Number of ranks.
    pub fn num_ranks(&self) -> usize {
        self.coverage.len()
    }

    /// Checks the input before mining.
    ///
    /// # Errors
    ///
    /// - [`FinError::InvalidConfig`] for a zero minimum support
    /// - [`FinError::Fim`] if `total_tids` is not addressable
    /// - [`FinError::CoverageMismatch`] for a TID at or past `total_tids`
    pub fn validate(&self) -> FinResult<()> {
        if self.min_support_count == 0 {
            return Err(FinError::InvalidConfig(
                "min_support_count must be at least 1".to_string(),
            ));
        }
        if self.total_tids > u64::from(u32::MAX) {
            return Err(FimError::CapacityExceeded {
                what: "transaction count",
                requested: self.total_tids,
            }
            .into());
        }
        for (rank, cov) in self.coverage.iter().enumerate() {
            if let Some(max) = cov.max() {
                if u64::from(max) >= self.total_tids {
                    return Err(FinError::CoverageMismatch {
                        rank: rank as Rank,
                        expected: self.total_tids,
                        actual: u64::from(max),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Read-only state shared by every task of a run.
#[derive(Debug)]
pub struct MiningContext<'a> {
    input: &'a MiningInput,
    supports: Vec<SupportCount>,
}

impl<'a> MiningContext<'a> {
    /// Wraps a validated input and caches per-item supports.
    pub fn new(input: &'a MiningInput) -> Self {
        let supports = input.coverage.iter().map(TidBits::len).collect();
        Self { input, supports }
    }

    /// Number of ranks.
    pub fn num_ranks(&self) -> usize {
        self.supports.len()
    }

    /// Number of transactions.
    pub fn total_tids(&self) -> u32 {
        // validated to fit
        self.input.total_tids as u32
    }

    /// Minimum support count.
    pub fn min_support(&self) -> SupportCount {
        self.input.min_support_count
    }

    /// Support of a single item.
    pub fn item_support(&self, rank: Rank) -> SupportCount {
        self.supports[rank as usize]
    }

    /// Coverage of a single item.
    pub fn item_coverage(&self, rank: Rank) -> &'a TidBits {
        &self.input.coverage[rank as usize]
    }
}

/// Depth-first miner for one task.
///
/// Owns the task's order-code registry; nothing is shared with other tasks
/// except the read-only [`MiningContext`].
pub struct SubtreeMiner<'a> {
    ctx: &'a MiningContext<'a>,
    registry: PpcRegistry,
    stats: MiningStats,
}

impl<'a> SubtreeMiner<'a> {
    /// Creates a miner with an empty registry.
    pub fn new(ctx: &'a MiningContext<'a>) -> Self {
        Self {
            ctx,
            registry: PpcRegistry::new(),
            stats: MiningStats::default(),
        }
    }

    /// Mines the subtree of `start`, a freshly spawned node.
    ///
    /// With `cut_depth`, nodes spawned at that depth are neither checked nor
    /// expanded: they are returned as task roots instead.
    pub fn run<A: ResultAccumulator>(
        &mut self,
        mut start: WorkingNode,
        cut_depth: Option<usize>,
        acc: &mut A,
    ) -> Vec<WorkingNode> {
        let mut tasks = Vec::new();
        self.visit(&mut start, acc);
        let mut stack = vec![start];
        // registry length right after each stacked node was visited
        let mut marks = vec![self.registry.len()];

        while let Some(top) = stack.last_mut() {
            let Some(son) = top.pop_son() else {
                let slot = top.slot;
                stack.pop();
                if let Some(slot) = slot {
                    self.registry.finish(slot);
                }
                if let Some(mark) = marks.pop() {
                    self.registry.truncate(mark);
                }
                continue;
            };

            let (mut child, outcome) = top.spawn(son, self.ctx.min_support());
            self.stats.nodes_spawned += 1;
            self.stats.pruned_extensions += outcome.pruned;
            self.stats.equivalent_items += outcome.equivalent;
            self.stats.max_depth = self.stats.max_depth.max(child.depth());

            if cut_depth == Some(child.depth()) {
                tasks.push(child);
                continue;
            }
            self.visit(&mut child, acc);
            stack.push(child);
            marks.push(self.registry.len());
        }
        tasks
    }

    /// Emits `node` if its itemset is closed.
    fn visit<A: ResultAccumulator>(&mut self, node: &mut WorkingNode, acc: &mut A) {
        let label = node.label();
        if label.is_empty() {
            return;
        }
        let fingerprint = node.coverage().fingerprint();

        if self.subsumed_by_registered(node, &label, fingerprint) {
            self.stats.suppressed_by_registry += 1;
            trace!(
                "non-closed {:?} (support {}): subsumed by an emitted itemset",
                label,
                node.support()
            );
            return;
        }
        if let Some(item) = self.covering_item(node, &label) {
            self.stats.suppressed_by_item += 1;
            trace!(
                "non-closed {:?} (support {}): item {} covers it",
                label,
                node.support(),
                item
            );
            return;
        }

        acc.add_closed_itemset(
            node.support(),
            node.path(),
            node.inherited_equivalents(),
            node.own_equivalents(),
        );
        node.slot = Some(self.registry.register(node.support(), fingerprint, label));
        self.stats.closed_emitted += 1;
    }

    fn subsumed_by_registered(&self, node: &WorkingNode, label: &[Rank], fingerprint: u64) -> bool {
        let pending = PpcNode::open(node.support(), self.registry.next_pre());
        self.registry.with_support(node.support()).any(|entry| {
            if entry.fingerprint != fingerprint || entry.node.is_ancestor_of(&pending) {
                return false;
            }
            let mut extra = entry
                .label
                .iter()
                .filter(|rank| label.binary_search(rank).is_err())
                .peekable();
            extra.peek().is_some()
                && extra.all(|&rank| node.coverage().is_subset_of(self.ctx.item_coverage(rank)))
        })
    }

    fn covering_item(&self, node: &WorkingNode, label: &[Rank]) -> Option<Rank> {
        (0..self.ctx.num_ranks() as Rank).find(|&item| {
            self.ctx.item_support(item) >= node.support()
                && label.binary_search(&item).is_err()
                && !node.has_son(item)
                && node.coverage().is_subset_of(self.ctx.item_coverage(item))
        })
    }

    /// The task's order-code registry.
    pub fn registry(&self) -> &PpcRegistry {
        &self.registry
    }

    /// Counters collected so far.
    pub fn stats(&self) -> &MiningStats {
        &self.stats
    }

    /// Consumes the miner, returning its counters.
    pub fn into_stats(self) -> MiningStats {
        self.stats
    }
}

/// Result of a mining run.
#[derive(Debug, Clone)]
pub struct MiningOutcome<A> {
    /// The united accumulator.
    pub result: A,
    /// Counters summed over all tasks.
    pub stats: MiningStats,
}

/// Closed-itemset miner.
///
/// # Example
///
/// ```rust
/// use fimcmp_fin::{CountingAccumulator, FinMiner, MiningInput};
///
/// // 0:{0,1,2} 1:{0,1} 2:{0,2} 3:{1,2}
/// let input = MiningInput::from_transactions(
///     &[vec![0, 1, 2], vec![0, 1], vec![0, 2], vec![1, 2]],
///     3,
///     2,
/// )?;
///
/// let outcome = FinMiner::new().mine(&input, CountingAccumulator::new)?;
/// assert_eq!(outcome.result.count(), 6);
/// # Ok::<(), fimcmp_fin::FinError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FinMiner {
    config: FinConfig,
}

impl FinMiner {
    /// Creates a miner with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a miner with custom configuration.
    pub fn with_config(config: FinConfig) -> Self {
        Self { config }
    }

    /// Returns the miner configuration.
    pub fn config(&self) -> &FinConfig {
        &self.config
    }

    /// Mines every closed frequent itemset of `input`.
    ///
    /// `factory` creates one accumulator for the prefix expansion and one per
    /// task (or one overall when mining sequentially); the parts are united
    /// at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the input is invalid.
    pub fn mine<A, F>(&self, input: &MiningInput, factory: F) -> FinResult<MiningOutcome<A>>
    where
        A: ResultAccumulator,
        F: Fn() -> A + Sync,
    {
        self.config.validate()?;
        input.validate()?;
        let ctx = MiningContext::new(input);

        let mut roots_acc = factory();
        let (tasks, mut stats) =
            roots::expand_prefix(&ctx, self.config.root_prefix_len, &mut roots_acc);
        let (tasks_acc, task_stats) = self.mine_tasks(&ctx, tasks, &factory);
        stats.absorb(&task_stats);

        debug!(
            "mined {} closed itemsets in {} tasks ({} non-closed nodes)",
            stats.closed_emitted,
            stats.tasks,
            stats.suppressed()
        );
        Ok(MiningOutcome {
            result: roots_acc.unite_with(tasks_acc),
            stats,
        })
    }

    /// Mines and collects every closed itemset, sorted by items.
    pub fn mine_collect(&self, input: &MiningInput) -> FinResult<Vec<ClosedItemset>> {
        let outcome = self.mine(input, ClosedItemsetCollector::new)?;
        Ok(outcome.result.into_sorted())
    }

    fn mine_tasks<A, F>(
        &self,
        ctx: &MiningContext<'_>,
        tasks: Vec<WorkingNode>,
        factory: &F,
    ) -> (A, MiningStats)
    where
        A: ResultAccumulator,
        F: Fn() -> A + Sync,
    {
        #[cfg(feature = "parallel")]
        if self.config.parallel {
            return mine_parallel(ctx, tasks, factory);
        }
        #[cfg(not(feature = "parallel"))]
        if self.config.parallel {
            warn!("parallel mining requested without the `parallel` feature; mining sequentially");
        }
        mine_sequential(ctx, tasks, factory)
    }
}

fn mine_task<A: ResultAccumulator>(
    ctx: &MiningContext<'_>,
    task: WorkingNode,
    acc: &mut A,
) -> MiningStats {
    let path = task.path().to_vec();
    let mut miner = SubtreeMiner::new(ctx);
    miner.run(task, None, acc);
    let mut stats = miner.into_stats();
    stats.tasks = 1;
    debug!(
        "task {:?}: {} closed, {} non-closed, depth {}",
        path,
        stats.closed_emitted,
        stats.suppressed(),
        stats.max_depth
    );
    stats
}

fn mine_sequential<A, F>(ctx: &MiningContext<'_>, tasks: Vec<WorkingNode>, factory: &F) -> (A, MiningStats)
where
    A: ResultAccumulator,
    F: Fn() -> A,
{
    let mut acc = factory();
    let mut stats = MiningStats::default();
    for task in tasks {
        stats.absorb(&mine_task(ctx, task, &mut acc));
    }
    (acc, stats)
}

#[cfg(feature = "parallel")]
fn mine_parallel<A, F>(ctx: &MiningContext<'_>, tasks: Vec<WorkingNode>, factory: &F) -> (A, MiningStats)
where
    A: ResultAccumulator,
    F: Fn() -> A + Sync,
{
    use rayon::prelude::*;

    tasks
        .into_par_iter()
        .map(|task| {
            let mut acc = factory();
            let stats = mine_task(ctx, task, &mut acc);
            (acc, stats)
        })
        .reduce(
            || (factory(), MiningStats::default()),
            |(a, a_stats), (b, b_stats)| (a.unite_with(b), a_stats.combine(b_stats)),
        )
}
