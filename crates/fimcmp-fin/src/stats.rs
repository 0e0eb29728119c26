//! Counters collected while mining.

/// Statistics about a mining run, summed over all tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiningStats {
    /// Number of subtree tasks mined.
    pub tasks: usize,
    /// Tree nodes spawned (closed or not).
    pub nodes_spawned: u64,
    /// Closed itemsets emitted.
    pub closed_emitted: u64,
    /// Nodes suppressed by a same-support registry entry.
    pub suppressed_by_registry: u64,
    /// Nodes suppressed by the item scan.
    pub suppressed_by_item: u64,
    /// Sibling extensions pruned for low support.
    pub pruned_extensions: u64,
    /// Sibling extensions folded in as equivalent items.
    pub equivalent_items: u64,
    /// Deepest DFS path seen, in items.
    pub max_depth: usize,
}

impl MiningStats {
    /// Nodes that were not emitted because their itemset is not closed.
    pub fn suppressed(&self) -> u64 {
        self.suppressed_by_registry + self.suppressed_by_item
    }

    /// Adds the counters of `other` into `self`.
    pub fn absorb(&mut self, other: &MiningStats) {
        self.tasks += other.tasks;
        self.nodes_spawned += other.nodes_spawned;
        self.closed_emitted += other.closed_emitted;
        self.suppressed_by_registry += other.suppressed_by_registry;
        self.suppressed_by_item += other.suppressed_by_item;
        self.pruned_extensions += other.pruned_extensions;
        self.equivalent_items += other.equivalent_items;
        self.max_depth = self.max_depth.max(other.max_depth);
    }

    /// Combines two stats by value.
    pub fn combine(mut self, other: MiningStats) -> MiningStats {
        self.absorb(&other);
        self
    }
}

impl std::fmt::Display for MiningStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Closed Itemset Mining Statistics:")?;
        writeln!(f, "  Tasks:             {}", self.tasks)?;
        writeln!(f, "  Nodes spawned:     {}", self.nodes_spawned)?;
        writeln!(f, "  Closed emitted:    {}", self.closed_emitted)?;
        writeln!(
            f,
            "  Non-closed:        {} (registry {}, item scan {})",
            self.suppressed(),
            self.suppressed_by_registry,
            self.suppressed_by_item
        )?;
        writeln!(f, "  Pruned extensions: {}", self.pruned_extensions)?;
        writeln!(f, "  Equivalent items:  {}", self.equivalent_items)?;
        writeln!(f, "  Max depth:         {}", self.max_depth)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine() {
        let a = MiningStats {
            tasks: 1,
            closed_emitted: 4,
            suppressed_by_item: 1,
            max_depth: 3,
            ..Default::default()
        };
        let b = MiningStats {
            tasks: 2,
            closed_emitted: 1,
            suppressed_by_registry: 2,
            max_depth: 2,
            ..Default::default()
        };
        let c = a.combine(b);
        assert_eq!(c.tasks, 3);
        assert_eq!(c.closed_emitted, 5);
        assert_eq!(c.suppressed(), 3);
        assert_eq!(c.max_depth, 3);
    }

    #[test]
    fn test_display() {
        let stats = MiningStats {
            closed_emitted: 7,
            ..Default::default()
        };
        let text = stats.to_string();
        assert!(text.starts_with("Closed Itemset Mining Statistics:"));
        assert!(text.contains("Closed emitted:    7"));
    }
}
