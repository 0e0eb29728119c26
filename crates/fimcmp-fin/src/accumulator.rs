//! Result accumulators.
//!
//! The miner never stores results itself: every closed itemset is handed to
//! a [`ResultAccumulator`]. Parallel runs give each task its own accumulator
//! and combine them with [`ResultAccumulator::unite_with`], which must be
//! associative and commutative.

use fimcmp::{Rank, RankEncoder, SupportCount};

/// Receives closed itemsets from the miner.
///
/// The full itemset of a call is `itemset ∪ parent_equivalents ∪
/// own_equivalents`; the three parts are disjoint.
pub trait ResultAccumulator: Send + Sized {
    /// Records one closed itemset.
    fn add_closed_itemset(
        &mut self,
        support: SupportCount,
        itemset: &[Rank],
        parent_equivalents: &[Rank],
        own_equivalents: &[Rank],
    );

    /// Combines two partial results.
    fn unite_with(self, other: Self) -> Self;
}

/// Counts closed itemsets and the distribution of their lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountingAccumulator {
    closed: u64,
    by_len: Vec<u64>,
}

impl CountingAccumulator {
    /// Creates an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of closed itemsets seen.
    pub fn count(&self) -> u64 {
        self.closed
    }

    /// Number of closed itemsets with exactly `len` items.
    pub fn count_of_len(&self, len: usize) -> u64 {
        self.by_len.get(len).copied().unwrap_or(0)
    }

    /// Length of the longest closed itemset, `0` if none.
    pub fn max_len(&self) -> usize {
        self.by_len.iter().rposition(|&n| n > 0).unwrap_or(0)
    }

    /// `(length, count)` for every length that occurred.
    pub fn histogram(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.by_len
            .iter()
            .enumerate()
            .filter(|(_, &n)| n > 0)
            .map(|(len, &n)| (len, n))
    }
}

impl ResultAccumulator for CountingAccumulator {
    fn add_closed_itemset(
        &mut self,
        _support: SupportCount,
        itemset: &[Rank],
        parent_equivalents: &[Rank],
        own_equivalents: &[Rank],
    ) {
        let len = itemset.len() + parent_equivalents.len() + own_equivalents.len();
        if self.by_len.len() <= len {
            self.by_len.resize(len + 1, 0);
        }
        self.by_len[len] += 1;
        self.closed += 1;
    }

    fn unite_with(mut self, mut other: Self) -> Self {
        if other.by_len.len() > self.by_len.len() {
            std::mem::swap(&mut self, &mut other);
        }
        for (dst, n) in self.by_len.iter_mut().zip(other.by_len) {
            *dst += n;
        }
        self.closed += other.closed;
        self
    }
}

/// A closed itemset with its support.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClosedItemset {
    /// Ranks of the items, ascending.
    pub items: Vec<Rank>,
    /// Number of transactions containing the itemset.
    pub support: SupportCount,
}

impl ClosedItemset {
    /// Creates a closed itemset, sorting the items.
    pub fn new(mut items: Vec<Rank>, support: SupportCount) -> Self {
        items.sort_unstable();
        items.dedup();
        Self { items, support }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true for the empty itemset.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item labels, in rank order.
    pub fn labels<'a>(&self, encoder: &'a RankEncoder) -> Vec<&'a str> {
        encoder.labels(&self.items)
    }
}

/// Collects every closed itemset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClosedItemsetCollector {
    itemsets: Vec<ClosedItemset>,
}

impl ClosedItemsetCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected itemsets.
    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    /// Returns true if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    /// Collected itemsets, in arrival order.
    pub fn itemsets(&self) -> &[ClosedItemset] {
        &self.itemsets
    }

    /// Collected itemsets sorted by items, for order-independent comparison.
    pub fn into_sorted(mut self) -> Vec<ClosedItemset> {
        self.itemsets.sort_unstable();
        self.itemsets
    }
}

impl ResultAccumulator for ClosedItemsetCollector {
    fn add_closed_itemset(
        &mut self,
        support: SupportCount,
        itemset: &[Rank],
        parent_equivalents: &[Rank],
        own_equivalents: &[Rank],
    ) {
        let items = itemset
            .iter()
            .chain(parent_equivalents)
            .chain(own_equivalents)
            .copied()
            .collect();
        self.itemsets.push(ClosedItemset::new(items, support));
    }

    fn unite_with(mut self, mut other: Self) -> Self {
        if other.itemsets.len() > self.itemsets.len() {
            std::mem::swap(&mut self, &mut other);
        }
        self.itemsets.append(&mut other.itemsets);
        self
    }
}
