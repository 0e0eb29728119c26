//! Pre/post order codes for emitted tree nodes.
//!
//! Every closed node emitted by a task receives a preorder code when it is
//! emitted and a postorder code once its sons are drained. The pair answers
//! ancestor queries in O(1) without keeping parent links alive: the tree
//! itself is discarded as the traversal moves on.
//!
//! The registry only holds the closed nodes on the current DFS path and the
//! finished closed sons of those nodes. When a node is popped, everything
//! registered below it is dropped with [`PpcRegistry::truncate`], so the
//! live size is bounded by path length times fan-out, not by the number of
//! results.

use std::collections::HashMap;

use fimcmp::{Rank, SupportCount};

/// Support plus pre/post order codes of one emitted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpcNode {
    support: SupportCount,
    pre: u32,
    post: Option<u32>,
}

impl PpcNode {
    /// An open node: its postorder code is still pending.
    pub fn open(support: SupportCount, pre: u32) -> Self {
        Self {
            support,
            pre,
            post: None,
        }
    }

    /// Support of the node's itemset.
    pub fn support(&self) -> SupportCount {
        self.support
    }

    /// Preorder code.
    pub fn pre(&self) -> u32 {
        self.pre
    }

    /// Postorder code, `None` while the node is on the DFS path.
    pub fn post(&self) -> Option<u32> {
        self.post
    }

    /// Whether the postorder code has been assigned.
    pub fn is_finished(&self) -> bool {
        self.post.is_some()
    }

    /// Assigns the postorder code.
    ///
    /// # Panics
    ///
    /// Panics if the code was already assigned.
    pub fn finish(&mut self, post: u32) {
        assert!(
            self.post.is_none(),
            "postorder code of node {} assigned twice",
            self.pre
        );
        self.post = Some(post);
    }

    /// Returns true if `self` is a proper ancestor of `other`.
    ///
    /// A pending postorder code counts as +∞. Two open nodes both lie on
    /// the current DFS path, so the one with the smaller preorder code is
    /// the ancestor.
    pub fn is_ancestor_of(&self, other: &PpcNode) -> bool {
        if self.pre >= other.pre {
            return false;
        }
        match (self.post, other.post) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => a > b,
        }
    }
}

/// A registry entry: the order-coded node plus what closure checks need.
#[derive(Debug, Clone)]
pub struct RegisteredNode {
    /// Order codes and support.
    pub node: PpcNode,
    /// Fingerprint of the node's coverage.
    pub fingerprint: u64,
    /// Full, sorted itemset label.
    pub label: Vec<Rank>,
}

/// Per-task registry of emitted nodes, indexed by support.
///
/// Owns the pre/post counters so codes are unique within a task, including
/// across truncations.
#[derive(Debug, Default)]
pub struct PpcRegistry {
    nodes: Vec<RegisteredNode>,
    by_support: HashMap<SupportCount, Vec<usize>>,
    next_pre: u32,
    next_post: u32,
    peak: usize,
}

impl PpcRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The preorder code the next registered node will receive.
    pub fn next_pre(&self) -> u32 {
        self.next_pre
    }

    /// Registers an emitted node and returns its slot.
    pub fn register(&mut self, support: SupportCount, fingerprint: u64, label: Vec<Rank>) -> usize {
        let slot = self.nodes.len();
        self.nodes.push(RegisteredNode {
            node: PpcNode::open(support, self.next_pre),
            fingerprint,
            label,
        });
        self.next_pre += 1;
        self.by_support.entry(support).or_default().push(slot);
        self.peak = self.peak.max(self.nodes.len());
        slot
    }

    /// Drops every node registered at or after slot `len`.
    ///
    /// Slots below `len` stay valid. Called with the registry length taken
    /// right after a node was visited, this removes exactly that node's
    /// descendants.
    pub fn truncate(&mut self, len: usize) {
        while self.nodes.len() > len {
            let Some(entry) = self.nodes.pop() else {
                break;
            };
            let support = entry.node.support();
            // slots are pushed in increasing order, so the dropped slot is
            // the last one of its bucket
            if let Some(bucket) = self.by_support.get_mut(&support) {
                bucket.pop();
                if bucket.is_empty() {
                    self.by_support.remove(&support);
                }
            }
        }
    }

    /// Assigns the next postorder code to the node in `slot`.
    pub fn finish(&mut self, slot: usize) {
        let post = self.next_post;
        self.nodes[slot].node.finish(post);
        self.next_post += 1;
    }

    /// Registered nodes with exactly this support, in emission order.
    pub fn with_support(&self, support: SupportCount) -> impl Iterator<Item = &RegisteredNode> {
        self.by_support
            .get(&support)
            .into_iter()
            .flatten()
            .map(|&slot| &self.nodes[slot])
    }

    /// Every live node, in emission (preorder) order.
    pub fn nodes(&self) -> &[RegisteredNode] {
        &self.nodes
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Largest number of live nodes seen at once.
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// Returns true if no node is live.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(support: SupportCount, pre: u32, post: u32) -> PpcNode {
        let mut node = PpcNode::open(support, pre);
        node.finish(post);
        node
    }

    #[test]
    fn test_finished_ancestor() {
        // root(pre 0, post 2) -> a(pre 1, post 0), b(pre 2, post 1)
        let root = finished(10, 0, 2);
        let a = finished(6, 1, 0);
        let b = finished(4, 2, 1);
        assert!(root.is_ancestor_of(&a));
        assert!(root.is_ancestor_of(&b));
        assert!(!a.is_ancestor_of(&b));
        assert!(!b.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&root));
    }

    #[test]
    fn test_open_nodes_on_path() {
        let root = PpcNode::open(10, 0);
        let child = PpcNode::open(5, 1);
        assert!(root.is_ancestor_of(&child));
        assert!(!child.is_ancestor_of(&root));
        assert!(!root.is_ancestor_of(&root));
    }

    #[test]
    fn test_finished_is_never_ancestor_of_open() {
        let done = finished(5, 1, 0);
        let open = PpcNode::open(3, 2);
        assert!(!done.is_ancestor_of(&open));
        assert!(PpcNode::open(9, 0).is_ancestor_of(&done));
    }

    #[test]
    #[should_panic(expected = "assigned twice")]
    fn test_double_finish_panics() {
        let mut node = finished(1, 0, 0);
        node.finish(1);
    }

    #[test]
    fn test_registry_codes_and_lookup() {
        let mut registry = PpcRegistry::new();
        let a = registry.register(5, 11, vec![0]);
        let b = registry.register(3, 22, vec![0, 1]);
        let c = registry.register(3, 33, vec![0, 2]);
        assert_eq!(registry.next_pre(), 3);

        registry.finish(b);
        registry.finish(c);
        registry.finish(a);

        let nodes = registry.nodes();
        assert_eq!(nodes[a].node.post(), Some(2));
        assert!(nodes[a].node.is_ancestor_of(&nodes[b].node));
        assert!(!nodes[b].node.is_ancestor_of(&nodes[c].node));

        let same: Vec<u64> = registry.with_support(3).map(|n| n.fingerprint).collect();
        assert_eq!(same, vec![22, 33]);
        assert_eq!(registry.with_support(4).count(), 0);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_truncate_drops_descendants() {
        // a(5) -> b(3) -> c(3), then a second son d(3) of a
        let mut registry = PpcRegistry::new();
        let a = registry.register(5, 1, vec![0]);
        let mark_a = registry.len();
        let b = registry.register(3, 2, vec![0, 1]);
        let mark_b = registry.len();
        let c = registry.register(3, 3, vec![0, 1, 2]);
        registry.finish(c);
        registry.truncate(registry.len());
        registry.finish(b);
        registry.truncate(mark_b);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.with_support(3).count(), 1);

        let d = registry.register(3, 4, vec![0, 2]);
        assert_eq!(d, 2);
        assert_eq!(registry.nodes()[d].node.pre(), 3);
        let same: Vec<u64> = registry.with_support(3).map(|n| n.fingerprint).collect();
        assert_eq!(same, vec![2, 4]);

        registry.finish(d);
        registry.finish(a);
        registry.truncate(mark_a);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.with_support(3).count(), 0);
        assert_eq!(registry.nodes()[a].node.post(), Some(3));
        assert_eq!(registry.peak(), 3);

        registry.truncate(0);
        assert!(registry.is_empty());
        assert_eq!(registry.with_support(5).count(), 0);
    }
}
