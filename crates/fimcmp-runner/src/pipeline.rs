//! The end-to-end mining pipeline.
//!
//! ```text
//! text ─parse─▶ labels ─RankEncoder─▶ ranks ─partition─▶ PartitionTidIndex
//!      ─merge─▶ MiningInput ─FinMiner─▶ closed itemsets
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use fimcmp::{RankEncoder, Rank, SupportCount};
use fimcmp_fin::{
    ClosedItemsetCollector, CountingAccumulator, FinMiner, MiningInput, MiningStats,
    ResultAccumulator,
};
use log::info;

use crate::config::RunConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::parse::parse_transactions;
use crate::substrate::{build_and_merge, partition_with_tids};

/// Wall-clock time spent in each pipeline phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    /// Parsing transaction text (zero when mining pre-parsed input).
    pub parse: Duration,
    /// Counting item supports and rank-encoding transactions.
    pub encode: Duration,
    /// Building and merging the partition TID index.
    pub index: Duration,
    /// Running the miner.
    pub mine: Duration,
}

impl PhaseTimings {
    /// Sum of all phases.
    pub fn total(&self) -> Duration {
        self.parse + self.encode + self.index + self.mine
    }
}

/// A closed itemset expressed in item labels.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelledItemset {
    /// Item labels, most frequent item first.
    pub items: Vec<String>,
    /// Number of transactions containing all items.
    pub support: SupportCount,
}

/// Rank-encoded, indexed input ready for mining.
#[derive(Debug)]
pub struct PreparedInput {
    /// Label/rank mapping of the frequent items.
    pub encoder: RankEncoder,
    /// Item coverage over all transactions.
    pub input: MiningInput,
    /// Time spent so far.
    pub timings: PhaseTimings,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone)]
pub struct MiningReport {
    /// Number of input transactions.
    pub total_transactions: u64,
    /// Absolute minimum support used.
    pub min_support_count: SupportCount,
    /// Number of frequent items.
    pub frequent_items: usize,
    /// Closed itemsets, ordered by their ranks.
    pub itemsets: Vec<LabelledItemset>,
    /// Miner counters.
    pub stats: MiningStats,
    /// Time per phase.
    pub timings: PhaseTimings,
}

impl fmt::Display for MiningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mining Report:")?;
        writeln!(f, "  Transactions:      {}", self.total_transactions)?;
        writeln!(f, "  Min support:       {}", self.min_support_count)?;
        writeln!(f, "  Frequent items:    {}", self.frequent_items)?;
        writeln!(f, "  Closed itemsets:   {}", self.itemsets.len())?;
        writeln!(f, "  Parse time:        {:?}", self.timings.parse)?;
        writeln!(f, "  Encode time:       {:?}", self.timings.encode)?;
        writeln!(f, "  Index time:        {:?}", self.timings.index)?;
        writeln!(f, "  Mine time:         {:?}", self.timings.mine)?;
        write!(f, "  Total time:        {:?}", self.timings.total())
    }
}

/// Parses FIMI text and mines its closed itemsets.
///
/// # Example
///
/// ```rust
/// use fimcmp_runner::{mine_closed, RunConfig};
///
/// let text = "a b c\na b\na c\nb c\n";
/// let config = RunConfig::builder().with_min_support_count(2).build();
/// let report = mine_closed(text, &config)?;
///
/// assert_eq!(report.itemsets.len(), 6);
/// assert!(report.itemsets.iter().all(|c| c.support >= 2));
/// # Ok::<(), fimcmp_runner::RunnerError>(())
/// ```
pub fn mine_closed(text: &str, config: &RunConfig) -> RunnerResult<MiningReport> {
    let start = Instant::now();
    let transactions = parse_transactions(text)?;
    let parse = start.elapsed();
    info!("parsed {} transactions in {:?}", transactions.len(), parse);

    let mut report = mine_transactions(&transactions, config)?;
    report.timings.parse = parse;
    Ok(report)
}

/// Mines the closed itemsets of labelled transactions.
///
/// # Errors
///
/// - [`RunnerError::EmptyInput`] when there are no transactions
/// - [`RunnerError::InvalidSupport`] or [`RunnerError::InvalidConfig`] for a
///   bad configuration
pub fn mine_transactions<T, S>(transactions: &[T], config: &RunConfig) -> RunnerResult<MiningReport>
where
    T: AsRef<[S]>,
    S: AsRef<str>,
{
    let prepared = prepare(transactions, config)?;
    let (collector, stats, mine) = run_miner(&prepared, config, ClosedItemsetCollector::new)?;

    let itemsets = collector
        .into_sorted()
        .into_iter()
        .map(|closed| LabelledItemset {
            items: closed
                .labels(&prepared.encoder)
                .into_iter()
                .map(str::to_owned)
                .collect(),
            support: closed.support,
        })
        .collect();

    Ok(MiningReport {
        total_transactions: prepared.input.total_tids,
        min_support_count: prepared.input.min_support_count,
        frequent_items: prepared.encoder.len(),
        itemsets,
        stats,
        timings: PhaseTimings {
            mine,
            ..prepared.timings
        },
    })
}

/// Counts closed itemsets by length without materializing them.
pub fn count_closed<T, S>(
    transactions: &[T],
    config: &RunConfig,
) -> RunnerResult<(CountingAccumulator, MiningStats)>
where
    T: AsRef<[S]>,
    S: AsRef<str>,
{
    let prepared = prepare(transactions, config)?;
    let (counts, stats, _) = run_miner(&prepared, config, CountingAccumulator::new)?;
    Ok((counts, stats))
}

/// Encodes and indexes transactions; everything up to the miner.
pub fn prepare<T, S>(transactions: &[T], config: &RunConfig) -> RunnerResult<PreparedInput>
where
    T: AsRef<[S]>,
    S: AsRef<str>,
{
    config.validate()?;
    if transactions.is_empty() {
        return Err(RunnerError::EmptyInput);
    }
    let total = transactions.len() as u64;
    let min_support_count = config.min_support_count(total)?;

    let start = Instant::now();
    let encoder = RankEncoder::fit(transactions, min_support_count);
    let encoded: Vec<Vec<Rank>> = transactions
        .iter()
        .map(|tx| encoder.encode(tx.as_ref()))
        .collect();
    let encode = start.elapsed();
    info!(
        "ranked {} frequent items (min support {}) in {:?}",
        encoder.len(),
        min_support_count,
        encode
    );

    let start = Instant::now();
    let partitions = partition_with_tids(encoded, config.num_partitions);
    let index = build_and_merge(&partitions, encoder.len(), config.parallel)?;
    let input = MiningInput::from_index(index, total, min_support_count)?;
    let index = start.elapsed();
    info!(
        "indexed {} partitions in {:?}",
        partitions.len(),
        index
    );

    Ok(PreparedInput {
        encoder,
        input,
        timings: PhaseTimings {
            encode,
            index,
            ..PhaseTimings::default()
        },
    })
}

fn run_miner<A, F>(
    prepared: &PreparedInput,
    config: &RunConfig,
    factory: F,
) -> RunnerResult<(A, MiningStats, Duration)>
where
    A: ResultAccumulator,
    F: Fn() -> A + Sync,
{
    let start = Instant::now();
    let outcome = FinMiner::with_config(config.fin.clone()).mine(&prepared.input, factory)?;
    let elapsed = start.elapsed();
    info!(
        "mined {} closed itemsets in {:?}",
        outcome.stats.closed_emitted, elapsed
    );
    Ok((outcome.result, outcome.stats, elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basket() -> Vec<Vec<&'static str>> {
        vec![
            vec!["bread", "milk"],
            vec!["bread", "diapers", "beer", "eggs"],
            vec!["milk", "diapers", "beer", "cola"],
            vec!["bread", "milk", "diapers", "beer"],
            vec!["bread", "milk", "diapers", "cola"],
        ]
    }

    #[test]
    fn test_prepare_ranks_by_frequency() {
        let config = RunConfig::builder().with_min_support_count(3).build();
        let prepared = prepare(&basket(), &config).unwrap();

        // bread, milk, diapers: 4 each; beer: 3; eggs, cola dropped
        assert_eq!(prepared.encoder.len(), 4);
        assert_eq!(prepared.encoder.label(3), Some("beer"));
        assert_eq!(prepared.input.total_tids, 5);
        assert_eq!(prepared.input.num_ranks(), 4);
        assert_eq!(prepared.input.coverage[3].to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_mine_transactions_labels() {
        let config = RunConfig::builder().with_min_support_count(3).build();
        let report = mine_transactions(&basket(), &config).unwrap();

        assert_eq!(report.min_support_count, 3);
        assert!(report
            .itemsets
            .iter()
            .any(|c| c.items == ["diapers", "beer"] && c.support == 3));
        assert!(report.itemsets.iter().all(|c| c.support >= 3));
        assert_eq!(report.stats.closed_emitted, report.itemsets.len() as u64);
    }

    #[test]
    fn test_count_matches_collect() {
        let config = RunConfig::builder().with_min_support_ratio(0.4).build();
        let report = mine_transactions(&basket(), &config).unwrap();
        let (counts, _) = count_closed(&basket(), &config).unwrap();
        assert_eq!(counts.count(), report.itemsets.len() as u64);
    }

    #[test]
    fn test_empty_input() {
        let empty: Vec<Vec<&str>> = Vec::new();
        let err = mine_transactions(&empty, &RunConfig::default()).unwrap_err();
        assert_eq!(err, RunnerError::EmptyInput);
    }

    #[test]
    fn test_no_frequent_items() {
        let config = RunConfig::builder().with_min_support_count(6).build();
        let report = mine_transactions(&basket(), &config).unwrap();
        assert_eq!(report.frequent_items, 0);
        assert!(report.itemsets.is_empty());
    }

    #[test]
    fn test_report_display() {
        let config = RunConfig::builder().with_min_support_count(3).build();
        let report = mine_closed("a b\na b\na\n", &config).unwrap();
        let display = report.to_string();
        assert!(display.starts_with("Mining Report:"));
        assert!(display.contains("Transactions:      3"));
        assert!(display.contains("Closed itemsets:   1"));
        assert!(display.contains(&format!("Total time:        {:?}", report.timings.total())));
    }

    #[test]
    fn test_phase_timings_total() {
        let timings = PhaseTimings {
            parse: Duration::from_millis(1),
            encode: Duration::from_millis(2),
            index: Duration::from_millis(3),
            mine: Duration::from_millis(4),
        };
        assert_eq!(timings.total(), Duration::from_millis(10));
        assert_eq!(PhaseTimings::default().total(), Duration::ZERO);
    }
}
