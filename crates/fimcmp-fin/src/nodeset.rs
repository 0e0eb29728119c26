//! Difference-set nodes of the enumeration tree.
//!
//! A [`WorkingNode`] is one itemset on the DFS path. It keeps its coverage
//! (the TIDs of its itemset) and a queue of [`SonCandidate`]s, each carrying
//! its difference-set relative to the node. Sons are drained from the front;
//! the candidates still queued when a son is popped are that son's right
//! siblings, and only they are combined with it.

use std::collections::VecDeque;

use fimcmp::{Rank, SupportCount, TidBits};

/// A candidate extension of a node by one item.
#[derive(Debug, Clone)]
pub struct SonCandidate {
    /// The extending item.
    pub rank: Rank,
    /// TIDs of the parent that do not contain the item.
    pub diffset: TidBits,
    /// Support of the parent itemset extended by the item.
    pub support: SupportCount,
}

/// What happened to the right siblings while spawning a son.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnOutcome {
    /// Siblings dropped for falling below minimum support.
    pub pruned: u64,
    /// Siblings folded into the son's label as equivalent items.
    pub equivalent: u64,
}

/// One itemset on the DFS path, together with its pending sons.
#[derive(Debug, Clone)]
pub struct WorkingNode {
    path: Vec<Rank>,
    support: SupportCount,
    coverage: TidBits,
    sons: VecDeque<SonCandidate>,
    own_equivalents: Vec<Rank>,
    inherited_equivalents: Vec<Rank>,
    pub(crate) slot: Option<usize>,
}

impl WorkingNode {
    /// The node of the empty itemset over `total_tids` transactions.
    ///
    /// `candidates` must be given in drain order; items whose coverage is
    /// every transaction are folded in as equivalents instead of sons.
    pub fn empty_itemset<'a, I>(total_tids: u32, candidates: I) -> Self
    where
        I: IntoIterator<Item = (Rank, &'a TidBits)>,
    {
        let all = TidBits::full(total_tids as usize);
        let mut sons = VecDeque::new();
        let mut own_equivalents = Vec::new();
        for (rank, coverage) in candidates {
            let diffset = all.difference(coverage);
            if diffset.is_empty() {
                own_equivalents.push(rank);
            } else {
                sons.push_back(SonCandidate {
                    rank,
                    support: coverage.len(),
                    diffset,
                });
            }
        }
        Self {
            path: Vec::new(),
            support: u64::from(total_tids),
            coverage: all,
            sons,
            own_equivalents,
            inherited_equivalents: Vec::new(),
            slot: None,
        }
    }

    /// Items chosen along the DFS path, in the order they were added.
    pub fn path(&self) -> &[Rank] {
        &self.path
    }

    /// Number of items on the path.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Support of the itemset.
    pub fn support(&self) -> SupportCount {
        self.support
    }

    /// TIDs containing the itemset.
    pub fn coverage(&self) -> &TidBits {
        &self.coverage
    }

    /// Pending son candidates, in drain order.
    pub fn sons(&self) -> impl Iterator<Item = &SonCandidate> {
        self.sons.iter()
    }

    /// Whether `rank` is still queued as a son.
    pub fn has_son(&self, rank: Rank) -> bool {
        self.sons.iter().any(|s| s.rank == rank)
    }

    /// Items with the same coverage as this node, found among its siblings.
    pub fn own_equivalents(&self) -> &[Rank] {
        &self.own_equivalents
    }

    /// Equivalent items of every ancestor.
    pub fn inherited_equivalents(&self) -> &[Rank] {
        &self.inherited_equivalents
    }

    /// The full itemset: path plus both equivalent lists, sorted.
    pub fn label(&self) -> Vec<Rank> {
        let mut label: Vec<Rank> = self
            .path
            .iter()
            .chain(&self.inherited_equivalents)
            .chain(&self.own_equivalents)
            .copied()
            .collect();
        label.sort_unstable();
        label.dedup();
        label
    }

    /// Removes the next son candidate.
    pub fn pop_son(&mut self) -> Option<SonCandidate> {
        self.sons.pop_front()
    }

    /// Builds the node for `son`, which was just popped from `self`.
    ///
    /// Every candidate still queued in `self` is a right sibling `r` and is
    /// combined with the son: `d = d(r) \ d(son)`, `support = support(son) - |d|`.
    /// Below `min_support` the sibling is pruned; an empty `d` means the
    /// coverage is unchanged and the sibling becomes an equivalent item;
    /// otherwise it becomes a son of the new node.
    pub fn spawn(&self, son: SonCandidate, min_support: SupportCount) -> (WorkingNode, SpawnOutcome) {
        let mut outcome = SpawnOutcome::default();
        let mut sons = VecDeque::new();
        let mut own_equivalents = Vec::new();

        for right in &self.sons {
            let diffset = right.diffset.difference(&son.diffset);
            let support = son.support.saturating_sub(diffset.len());
            if support < min_support {
                outcome.pruned += 1;
            } else if diffset.is_empty() {
                own_equivalents.push(right.rank);
                outcome.equivalent += 1;
            } else {
                sons.push_back(SonCandidate {
                    rank: right.rank,
                    diffset,
                    support,
                });
            }
        }

        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(son.rank);

        let mut inherited_equivalents = self.inherited_equivalents.clone();
        inherited_equivalents.extend_from_slice(&self.own_equivalents);

        let node = WorkingNode {
            path,
            support: son.support,
            coverage: self.coverage.difference(&son.diffset),
            sons,
            own_equivalents,
            inherited_equivalents,
            slot: None,
        };
        (node, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_itemset(total_tids: u32, items: &[(Rank, &[u32])]) -> WorkingNode {
        let coverage: Vec<(Rank, TidBits)> = items
            .iter()
            .map(|&(rank, tids)| (rank, tids.iter().copied().collect()))
            .collect();
        WorkingNode::empty_itemset(total_tids, coverage.iter().map(|(r, b)| (*r, b)))
    }

    // TIDs: 0:{0,1,2} 1:{0,1} 2:{0,2} 3:{1,2}
    fn root() -> WorkingNode {
        empty_itemset(4, &[(2, &[0, 2, 3]), (1, &[0, 1, 3]), (0, &[0, 1, 2])])
    }

    #[test]
    fn test_empty_itemset_node() {
        let node = root();
        assert_eq!(node.support(), 4);
        assert_eq!(node.depth(), 0);
        assert_eq!(node.coverage().len(), 4);
        let ranks: Vec<Rank> = node.sons().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![2, 1, 0]);
        assert_eq!(node.sons().next().unwrap().diffset.to_vec(), vec![1]);
        assert!(node.own_equivalents().is_empty());
    }

    #[test]
    fn test_full_coverage_item_is_equivalent_of_empty_itemset() {
        let node = empty_itemset(2, &[(1, &[1]), (0, &[0, 1])]);
        assert_eq!(node.own_equivalents(), &[0]);
        assert_eq!(node.sons().count(), 1);
    }

    #[test]
    fn test_spawn_computes_diffsets_and_coverage() {
        let mut parent = root();
        let son = parent.pop_son().unwrap();
        let (node, outcome) = parent.spawn(son, 1);

        assert_eq!(node.path(), &[2]);
        assert_eq!(node.support(), 3);
        assert_eq!(node.coverage().to_vec(), vec![0, 2, 3]);
        // {2,1}: d = {2} \ {1} = {2}, support 2; {2,0}: d = {3}, support 2
        let sons: Vec<(Rank, Vec<u32>, u64)> = node
            .sons()
            .map(|s| (s.rank, s.diffset.to_vec(), s.support))
            .collect();
        assert_eq!(sons, vec![(1, vec![2], 2), (0, vec![3], 2)]);
        assert_eq!(outcome, SpawnOutcome::default());
    }

    #[test]
    fn test_spawn_prunes_infrequent_siblings() {
        let mut parent = root();
        let son = parent.pop_son().unwrap();
        let (node, outcome) = parent.spawn(son, 3);
        assert_eq!(node.sons().count(), 0);
        assert_eq!(outcome.pruned, 2);
    }

    #[test]
    fn test_spawn_folds_equivalent_items() {
        // item 1 occurs wherever item 2 occurs
        let mut parent = empty_itemset(3, &[(2, &[0, 1]), (1, &[0, 1, 2]), (0, &[2])]);
        // item 1 covers everything and becomes an equivalent of the empty itemset
        assert_eq!(parent.own_equivalents(), &[1]);

        let son = parent.pop_son().unwrap();
        let (node, outcome) = parent.spawn(son, 1);
        assert_eq!(outcome.pruned, 1);
        assert_eq!(node.inherited_equivalents(), &[1]);
        assert_eq!(node.label(), vec![1, 2]);
    }

    #[test]
    fn test_spawn_sibling_equivalence() {
        let mut parent = empty_itemset(4, &[(1, &[0, 1]), (0, &[0, 1, 2])]);
        let son = parent.pop_son().unwrap();
        let (node, outcome) = parent.spawn(son, 1);
        assert_eq!(outcome.equivalent, 1);
        assert_eq!(node.own_equivalents(), &[0]);
        assert!(!node.has_son(0));
        assert_eq!(node.label(), vec![0, 1]);
        assert_eq!(node.support(), 2);
    }
}
