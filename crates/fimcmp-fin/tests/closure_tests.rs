//! Integration tests for the closed-itemset miner.
//!
//! Results are checked against a brute-force enumeration of every itemset
//! over a small item universe.

use fimcmp::{PartitionTidIndex, Rank, SupportCount, Tid};
use fimcmp_fin::{
    ClosedItemsetCollector, CountingAccumulator, FinConfig, FinMiner, MiningInput,
};
use proptest::prelude::*;

const ITEMS: usize = 7;

/// Re-ranks item ids so that rank 0 is the most frequent item.
fn rank_by_frequency(transactions: &[Vec<u32>], num_items: usize) -> Vec<Vec<Rank>> {
    let mut counts = vec![0u64; num_items];
    for tx in transactions {
        for &item in tx {
            counts[item as usize] += 1;
        }
    }
    let mut order: Vec<usize> = (0..num_items).collect();
    order.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(a.cmp(&b)));
    let mut rank_of = vec![0 as Rank; num_items];
    for (rank, &item) in order.iter().enumerate() {
        rank_of[item] = rank as Rank;
    }
    transactions
        .iter()
        .map(|tx| {
            let mut ranks: Vec<Rank> = tx.iter().map(|&i| rank_of[i as usize]).collect();
            ranks.sort_unstable();
            ranks
        })
        .collect()
}

/// Every non-empty closed itemset with at least `min_support` occurrences.
fn brute_force_closed(
    transactions: &[Vec<Rank>],
    num_items: usize,
    min_support: SupportCount,
) -> Vec<(Vec<Rank>, SupportCount)> {
    let masks: Vec<u32> = transactions
        .iter()
        .map(|tx| tx.iter().fold(0u32, |m, &r| m | (1 << r)))
        .collect();
    let support = |set: u32| masks.iter().filter(|&&m| m & set == set).count() as SupportCount;

    let mut closed = Vec::new();
    for set in 1u32..(1 << num_items) {
        let s = support(set);
        if s < min_support {
            continue;
        }
        let is_closed = (0..num_items as u32)
            .filter(|item| set & (1 << item) == 0)
            .all(|item| support(set | (1 << item)) < s);
        if is_closed {
            let items = (0..num_items as Rank).filter(|r| set & (1 << r) != 0).collect();
            closed.push((items, s));
        }
    }
    closed.sort();
    closed
}

fn mine(input: &MiningInput, config: FinConfig) -> Vec<(Vec<Rank>, SupportCount)> {
    FinMiner::with_config(config)
        .mine_collect(input)
        .unwrap()
        .into_iter()
        .map(|c| (c.items, c.support))
        .collect()
}

fn transactions() -> impl Strategy<Value = Vec<Vec<u32>>> {
    proptest::collection::vec(
        proptest::sample::subsequence((0..ITEMS as u32).collect::<Vec<_>>(), 0..=ITEMS),
        1..40,
    )
}

#[test]
fn test_four_transaction_example() {
    let txs = vec![vec![0, 1, 2], vec![0, 1], vec![0, 2], vec![1, 2]];
    let input = MiningInput::from_transactions(&txs, 3, 2).unwrap();

    let found = mine(&input, FinConfig::default());
    assert_eq!(found, brute_force_closed(&txs, 3, 2));
    assert_eq!(found.len(), 6);
    // {0,1,2} occurs once and is below the threshold
    assert!(found.iter().all(|(items, _)| items.len() < 3));
}

#[test]
fn test_closed_itemsets_have_no_equal_support_superset() {
    let txs = vec![
        vec![0, 1, 2, 4],
        vec![0, 1, 2],
        vec![0, 1, 3],
        vec![0, 2, 3, 4],
        vec![1, 2],
        vec![0, 3],
    ];
    let input = MiningInput::from_transactions(&txs, 5, 2).unwrap();
    let found = mine(&input, FinConfig::default());
    assert_eq!(found, brute_force_closed(&txs, 5, 2));

    for (items, support) in &found {
        for (other, other_support) in &found {
            let proper_superset =
                other.len() > items.len() && items.iter().all(|r| other.contains(r));
            assert!(!(proper_superset && other_support == support));
        }
    }
}

#[test]
fn test_counting_matches_collecting() {
    let txs = vec![vec![0, 1], vec![0, 2], vec![1, 2], vec![0, 1, 2], vec![0]];
    let input = MiningInput::from_transactions(&txs, 3, 1).unwrap();

    let counted = FinMiner::new().mine(&input, CountingAccumulator::new).unwrap();
    let collected = FinMiner::new().mine(&input, ClosedItemsetCollector::new).unwrap();
    assert_eq!(counted.result.count(), collected.result.len() as u64);
    assert_eq!(counted.stats.closed_emitted, counted.result.count());
    assert_eq!(counted.result.count_of_len(3), 1);
}

#[test]
fn test_mining_merged_partitions() {
    let txs: Vec<Vec<Rank>> = vec![
        vec![0, 1, 2],
        vec![0, 1],
        vec![0, 2],
        vec![1, 2],
        vec![0, 1, 2],
        vec![0],
        vec![0, 1],
    ];
    let rows: Vec<(Vec<Rank>, Tid)> = txs
        .iter()
        .enumerate()
        .map(|(tid, ranks)| (ranks.clone(), tid as Tid))
        .collect();

    let index = PartitionTidIndex::build_partition(&rows[4..], 3)
        .unwrap()
        .merge(PartitionTidIndex::build_partition(&rows[..4], 3).unwrap())
        .unwrap();
    let input = MiningInput::from_index(index, rows.len() as u64, 2).unwrap();

    assert_eq!(mine(&input, FinConfig::default()), brute_force_closed(&txs, 3, 2));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn miner_matches_brute_force(raw in transactions(), min_support in 1u64..4) {
        let txs = rank_by_frequency(&raw, ITEMS);
        let input = MiningInput::from_transactions(&txs, ITEMS, min_support).unwrap();
        prop_assert_eq!(
            mine(&input, FinConfig::default()),
            brute_force_closed(&txs, ITEMS, min_support)
        );
    }

    #[test]
    fn prefix_length_and_parallelism_agree(
        raw in transactions(),
        min_support in 1u64..3,
        prefix in 2usize..4,
    ) {
        let txs = rank_by_frequency(&raw, ITEMS);
        let input = MiningInput::from_transactions(&txs, ITEMS, min_support).unwrap();
        let base = mine(&input, FinConfig::default());

        let prefixed = FinConfig::builder().with_root_prefix_len(prefix).build();
        prop_assert_eq!(&mine(&input, prefixed), &base);

        let parallel = FinConfig::builder()
            .with_root_prefix_len(prefix)
            .with_parallel(true)
            .build();
        prop_assert_eq!(&mine(&input, parallel), &base);
    }
}
