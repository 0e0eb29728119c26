//! Rank encoding of raw item labels.
//!
//! Items meeting minimum support receive a dense rank in descending order of
//! frequency (rank 0 is the most frequent item). Ties keep the order in which
//! the labels were first seen, so encoding is deterministic for a given input.
//! Infrequent items never receive a rank and are dropped from encoded
//! transactions.

use hashbrown::{HashMap, HashSet};

use crate::Rank;

/// Bidirectional mapping between item labels and dense frequency ranks.
///
/// The encoder is immutable after [`fit`](Self::fit); the rank→label side is
/// only needed to present results.
///
/// # Example
///
/// ```rust
/// use fimcmp::ranks::RankEncoder;
///
/// let txs = vec![vec!["a", "b"], vec!["b", "c"], vec!["b", "a"]];
/// let encoder = RankEncoder::fit(&txs, 2);
///
/// assert_eq!(encoder.len(), 2);
/// assert_eq!(encoder.rank("b"), Some(0));
/// assert_eq!(encoder.rank("a"), Some(1));
/// assert_eq!(encoder.rank("c"), None);
/// assert_eq!(encoder.encode(&["c", "a", "b"]), vec![0, 1]);
/// ```
#[derive(Clone, Default)]
pub struct RankEncoder {
    /// label -> rank mapping.
    label_to_rank: HashMap<String, Rank>,
    /// rank -> label mapping.
    rank_to_label: Vec<String>,
    /// rank -> support count.
    supports: Vec<u64>,
}

impl RankEncoder {
    /// Counts every label once per transaction and ranks those with at least
    /// `min_count` occurrences.
    pub fn fit<T, S>(transactions: &[T], min_count: u64) -> Self
    where
        T: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut counts: HashMap<&str, (u64, usize)> = HashMap::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for tx in transactions {
            seen.clear();
            for label in tx.as_ref() {
                let label = label.as_ref();
                if !seen.insert(label) {
                    continue;
                }
                let next = counts.len();
                counts.entry(label).or_insert((0, next)).0 += 1;
            }
        }

        let mut frequent: Vec<(&str, u64, usize)> = counts
            .into_iter()
            .filter(|&(_, (count, _))| count >= min_count)
            .map(|(label, (count, first))| (label, count, first))
            .collect();
        frequent.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let mut encoder = Self {
            label_to_rank: HashMap::with_capacity(frequent.len()),
            rank_to_label: Vec::with_capacity(frequent.len()),
            supports: Vec::with_capacity(frequent.len()),
        };
        for (label, count, _) in frequent {
            encoder
                .label_to_rank
                .insert(label.to_owned(), encoder.rank_to_label.len() as Rank);
            encoder.rank_to_label.push(label.to_owned());
            encoder.supports.push(count);
        }
        encoder
    }

    /// Rank of a label, if it is frequent.
    #[inline]
    pub fn rank(&self, label: &str) -> Option<Rank> {
        self.label_to_rank.get(label).copied()
    }

    /// Label of a rank.
    #[inline]
    pub fn label(&self, rank: Rank) -> Option<&str> {
        self.rank_to_label.get(rank as usize).map(String::as_str)
    }

    /// Global support count of a rank.
    #[inline]
    pub fn support(&self, rank: Rank) -> Option<u64> {
        self.supports.get(rank as usize).copied()
    }

    /// Number of ranked (frequent) items.
    #[inline]
    pub fn len(&self) -> usize {
        self.rank_to_label.len()
    }

    /// Returns true if no item is frequent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rank_to_label.is_empty()
    }

    /// Encodes a transaction as ascending, duplicate-free ranks.
    pub fn encode<S: AsRef<str>>(&self, transaction: &[S]) -> Vec<Rank> {
        let mut ranks: Vec<Rank> = transaction
            .iter()
            .filter_map(|label| self.rank(label.as_ref()))
            .collect();
        ranks.sort_unstable();
        ranks.dedup();
        ranks
    }

    /// Maps ranks back to labels; unknown ranks are skipped.
    pub fn labels(&self, ranks: &[Rank]) -> Vec<&str> {
        ranks.iter().filter_map(|&r| self.label(r)).collect()
    }

    /// Iterates `(rank, label)` pairs in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (Rank, &str)> + '_ {
        self.rank_to_label
            .iter()
            .enumerate()
            .map(|(i, label)| (i as Rank, label.as_str()))
    }
}

impl std::fmt::Debug for RankEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankEncoder")
            .field("len", &self.len())
            .field("supports", &self.supports)
            .finish()
    }
}
