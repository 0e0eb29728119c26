//! Partitioning and the partition-wise TID index build.

use fimcmp::{FimResult, PartitionTidIndex, Rank, Tid};
use log::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A rank-encoded transaction paired with its TID.
pub type TidRow = (Vec<Rank>, Tid);

/// Splits rows into at most `num_partitions` contiguous chunks, assigning
/// TIDs by position.
///
/// A `num_partitions` of 0 is treated as 1.
pub fn partition_with_tids(rows: Vec<Vec<Rank>>, num_partitions: usize) -> Vec<Vec<TidRow>> {
    let chunk = rows.len().div_ceil(num_partitions.max(1)).max(1);
    let mut partitions: Vec<Vec<TidRow>> = Vec::with_capacity(num_partitions.max(1));
    for (tid, ranks) in rows.into_iter().enumerate() {
        if tid % chunk == 0 {
            partitions.push(Vec::with_capacity(chunk));
        }
        if let Some(current) = partitions.last_mut() {
            current.push((ranks, tid as Tid));
        }
    }
    partitions
}

/// Builds one index per partition and merges them into a single index.
///
/// With `parallel` set and the `parallel` feature enabled, partitions are
/// built and merged on the rayon pool. The merge is commutative, so the
/// result does not depend on the reduction order.
pub fn build_and_merge(
    partitions: &[Vec<TidRow>],
    total_ranks: usize,
    parallel: bool,
) -> FimResult<PartitionTidIndex> {
    debug!(
        "building TID index over {} partitions, {} ranks (parallel: {})",
        partitions.len(),
        total_ranks,
        parallel
    );

    #[cfg(feature = "parallel")]
    if parallel {
        return partitions
            .par_iter()
            .map(|part| PartitionTidIndex::build_partition(part, total_ranks))
            .try_reduce(|| PartitionTidIndex::empty(total_ranks), |a, b| a.merge(b));
    }

    partitions
        .iter()
        .try_fold(PartitionTidIndex::empty(total_ranks), |acc, part| {
            acc.merge(PartitionTidIndex::build_partition(part, total_ranks)?)
        })
}
