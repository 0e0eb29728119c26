//! Property tests for the bitword algebra and the partition merge.

use fimcmp::bits;
use fimcmp::tidset::PartitionTidIndex;
use fimcmp::{Rank, Tid};
use proptest::prelude::*;
use proptest::sample::Index;

const RANKS: usize = 6;

fn transactions() -> impl Strategy<Value = Vec<Vec<Rank>>> {
    proptest::collection::vec(
        proptest::sample::subsequence((0..RANKS as Rank).collect::<Vec<_>>(), 0..=RANKS),
        1..300,
    )
}

/// Splits the transactions into three contiguous partitions and builds each.
fn partitions(txs: &[Vec<Rank>], a: Index, b: Index) -> [PartitionTidIndex; 3] {
    let rows: Vec<(Vec<Rank>, Tid)> = txs
        .iter()
        .enumerate()
        .map(|(tid, ranks)| (ranks.clone(), tid as Tid))
        .collect();
    let mut cuts = [a.index(rows.len() + 1), b.index(rows.len() + 1)];
    cuts.sort_unstable();
    let build = |slice: &[(Vec<Rank>, Tid)]| PartitionTidIndex::build_partition(slice, RANKS).unwrap();
    [
        build(&rows[..cuts[0]]),
        build(&rows[cuts[0]..cuts[1]]),
        build(&rows[cuts[1]..]),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn merge_is_commutative(txs in transactions(), a in any::<Index>(), b in any::<Index>()) {
        let [p0, p1, _] = partitions(&txs, a, b);
        prop_assert_eq!(p0.clone().merge(p1.clone()).unwrap(), p1.merge(p0).unwrap());
    }

    #[test]
    fn merge_is_associative(txs in transactions(), a in any::<Index>(), b in any::<Index>()) {
        let [p0, p1, p2] = partitions(&txs, a, b);
        let left = p0.clone().merge(p1.clone()).unwrap().merge(p2.clone()).unwrap();
        let right = p0.merge(p1.merge(p2).unwrap()).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn merge_order_is_free(txs in transactions(), a in any::<Index>(), b in any::<Index>()) {
        let [p0, p1, p2] = partitions(&txs, a, b);
        let in_order = p0.clone().merge(p1.clone()).unwrap().merge(p2.clone()).unwrap();
        let outer_first = p0.merge(p2).unwrap().merge(p1).unwrap();
        prop_assert_eq!(in_order, outer_first);
    }

    #[test]
    fn merge_matches_single_build(txs in transactions(), a in any::<Index>(), b in any::<Index>()) {
        let [p0, p1, p2] = partitions(&txs, a, b);
        let merged = p2.merge(p0).unwrap().merge(p1).unwrap();

        let rows: Vec<(Vec<Rank>, Tid)> = txs
            .iter()
            .enumerate()
            .map(|(tid, ranks)| (ranks.clone(), tid as Tid))
            .collect();
        let whole = PartitionTidIndex::build_partition(&rows, RANKS).unwrap();

        prop_assert_eq!(merged.supports(), whole.supports());
        prop_assert_eq!(merged.summaries(), whole.summaries());
        for rank in 0..RANKS as Rank {
            prop_assert_eq!(
                merged.get(rank).map(|s| s.tids()),
                whole.get(rank).map(|s| s.tids())
            );
        }
    }

    #[test]
    fn merge_cardinality_is_additive(txs in transactions(), a in any::<Index>(), b in any::<Index>()) {
        let [p0, p1, p2] = partitions(&txs, a, b);
        let expected: Vec<u64> = (0..RANKS)
            .map(|r| p0.supports()[r] + p1.supports()[r] + p2.supports()[r])
            .collect();
        let merged = p0.merge(p1).unwrap().merge(p2).unwrap();
        prop_assert_eq!(merged.supports(), expected);
    }

    #[test]
    fn decode_is_ascending_and_agrees_with_get(
        words in proptest::collection::vec(any::<u64>(), 1..8),
        header in 0usize..3,
    ) {
        let mut buf = vec![0u64; header];
        buf.extend_from_slice(&words);

        let decoded = bits::decode_ascending(&buf, header);
        prop_assert!(decoded.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(decoded.len() as u64, bits::cardinality(&buf, header));
        prop_assert_eq!(decoded.first().copied(), bits::min(&buf, header));
        prop_assert_eq!(decoded.last().copied(), bits::max(&buf, header));

        let universe = (words.len() * bits::BITS_PER_WORD) as u32;
        for bit in 0..universe {
            prop_assert_eq!(bits::get(&buf, header, bit), decoded.binary_search(&bit).is_ok());
        }
    }

    #[test]
    fn shifted_or_places_every_bit(
        src in proptest::collection::vec(any::<u64>(), 0..4),
        offset in 0usize..200,
    ) {
        let mut dst = vec![0u64; 8];
        bits::or_shifted(&mut dst, &src, offset);
        let expected: Vec<u32> = bits::decode_ascending(&src, 0)
            .into_iter()
            .map(|b| b + offset as u32)
            .collect();
        prop_assert_eq!(bits::decode_ascending(&dst, 0), expected);
    }
}
