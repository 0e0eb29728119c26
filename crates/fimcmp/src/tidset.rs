//! Per-partition TID-sets and their merge algebra.
//!
//! Each data partition owns a contiguous TID range. A partition build
//! produces one [`PartitionTidSet`] per rank that occurs in the partition,
//! with the bits stored relative to the partition's minimum TID so that every
//! per-partition bit-vector is as small as the partition itself.
//!
//! Sets for the same rank coming from different partitions are combined with
//! [`PartitionTidSet::merge`]. Every set and index tracks the partition
//! ranges it owns; owned ranges are pairwise disjoint, so the bits of two
//! operands never collide. A merge is a block copy of the operand whose span
//! starts lower plus a (possibly shifted) OR of the other at a computed word
//! offset, even when one operand's span encloses the other's ranges. The cost
//! is proportional to the result span, never to the size of the TID domain.
//! The merge is associative and commutative over valid operands, so it can be
//! used as a reduction over any partition count and tree shape.
//!
//! # Example
//!
//! ```rust
//! use fimcmp::tidset::{PartitionTidIndex, TidRange};
//!
//! let p0 = PartitionTidIndex::build(
//!     vec![(vec![5u32], 3u64), (vec![5], 10)],
//!     TidRange::new(0, 19),
//!     6,
//! )?;
//! let p1 = PartitionTidIndex::build(vec![(vec![5u32], 25u64)], TidRange::new(20, 29), 6)?;
//!
//! let merged = p0.merge(p1)?;
//! let set = merged.get(5).unwrap();
//! assert_eq!(set.cardinality(), 3);
//! assert_eq!((set.min_elem(), set.max_elem()), (3, 25));
//! # Ok::<(), fimcmp::FimError>(())
//! ```

use log::{debug, trace};

use crate::bits::{self, TidBits};
use crate::error::{FimError, FimResult};
use crate::{Rank, Tid};

/// Inclusive range of TIDs owned by a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TidRange {
    /// Smallest TID in the partition.
    pub min: Tid,
    /// Largest TID in the partition.
    pub max: Tid,
}

impl TidRange {
    /// Creates a range.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn new(min: Tid, max: Tid) -> Self {
        assert!(min <= max, "inverted TID range [{min}, {max}]");
        Self { min, max }
    }

    /// Computes the range of a partition in a single pass over its TIDs.
    ///
    /// Returns `None` for an empty partition.
    pub fn scan<I: IntoIterator<Item = Tid>>(tids: I) -> Option<Self> {
        tids.into_iter().fold(None, |acc: Option<TidRange>, tid| {
            Some(match acc {
                Some(r) => TidRange {
                    min: r.min.min(tid),
                    max: r.max.max(tid),
                },
                None => TidRange { min: tid, max: tid },
            })
        })
    }

    /// Number of TIDs covered by the range.
    #[inline]
    pub fn span(&self) -> u64 {
        (self.max - self.min).saturating_add(1)
    }

    /// Whether `tid` lies in the range.
    #[inline]
    pub fn contains(&self, tid: Tid) -> bool {
        self.min <= tid && tid <= self.max
    }

    /// Smallest range covering both.
    pub fn hull(&self, other: &TidRange) -> TidRange {
        TidRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Unites two sorted lists of disjoint ranges, coalescing ranges that
    /// touch.
    ///
    /// # Panics
    ///
    /// Panics if a range of `a` overlaps a range of `b`.
    fn union_disjoint(a: &[TidRange], b: &[TidRange]) -> Vec<TidRange> {
        let mut out: Vec<TidRange> = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() || j < b.len() {
            let next = if j == b.len() || (i < a.len() && a[i].min <= b[j].min) {
                i += 1;
                a[i - 1]
            } else {
                j += 1;
                b[j - 1]
            };
            match out.last_mut() {
                Some(last) => {
                    assert!(
                        last.max < next.min,
                        "overlapping partition ranges [{}, {}] and [{}, {}]",
                        last.min,
                        last.max,
                        next.min,
                        next.max
                    );
                    if last.max + 1 == next.min {
                        last.max = next.max;
                    } else {
                        out.push(next);
                    }
                }
                None => out.push(next),
            }
        }
        out
    }

    fn local_offset(&self, tid: Tid) -> FimResult<u32> {
        if !self.contains(tid) {
            return Err(FimError::TidOutOfRange {
                tid,
                min: self.min,
                max: self.max,
            });
        }
        u32::try_from(tid - self.min).map_err(|_| FimError::CapacityExceeded {
            what: "partition-local TID offset",
            requested: tid - self.min,
        })
    }
}

/// Flat description of a TID-set's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TidSetSummary {
    /// Item rank.
    pub rank: Rank,
    /// Number of TIDs.
    pub cardinality: u64,
    /// Smallest TID.
    pub min: Tid,
    /// Largest TID.
    pub max: Tid,
}

/// The TIDs of one rank within one partition (or a merged run of partitions).
///
/// Metadata (`cardinality`, `min_elem`, `max_elem`) always matches the bit
/// content. Element values are global TIDs; the bits are stored as offsets
/// from `range().min`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTidSet {
    rank: Rank,
    cardinality: u64,
    min_elem: Tid,
    max_elem: Tid,
    /// Hull of `owned`; the bits are relative to its minimum.
    range: TidRange,
    /// Sorted, disjoint partition ranges folded into this set.
    owned: Vec<TidRange>,
    bits: Vec<u64>,
}

impl PartitionTidSet {
    fn with_first_elem(rank: Rank, range: TidRange, num_words: usize, local: u32) -> Self {
        let mut bits = vec![0u64; num_words];
        bits::set(&mut bits, 0, local);
        let tid = range.min + u64::from(local);
        Self {
            rank,
            cardinality: 1,
            min_elem: tid,
            max_elem: tid,
            range,
            owned: vec![range],
            bits,
        }
    }

    /// Recomputes cardinality and bounds from the final bit content.
    fn refresh_metadata(&mut self) {
        self.cardinality = bits::cardinality(&self.bits, 0);
        match (bits::min(&self.bits, 0), bits::max(&self.bits, 0)) {
            (Some(lo), Some(hi)) => {
                self.min_elem = self.range.min + u64::from(lo);
                self.max_elem = self.range.min + u64::from(hi);
            }
            _ => {
                self.min_elem = self.range.min;
                self.max_elem = self.range.min;
            }
        }
    }

    /// The item rank this set belongs to.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Number of TIDs in the set.
    pub fn cardinality(&self) -> u64 {
        self.cardinality
    }

    /// Smallest TID in the set.
    pub fn min_elem(&self) -> Tid {
        self.min_elem
    }

    /// Largest TID in the set.
    pub fn max_elem(&self) -> Tid {
        self.max_elem
    }

    /// The span the bits are relative to: the hull of the owned ranges.
    pub fn range(&self) -> TidRange {
        self.range
    }

    /// The partition ranges folded into this set, sorted and disjoint.
    pub fn owned_ranges(&self) -> &[TidRange] {
        &self.owned
    }

    /// Raw, partition-relative bit words.
    pub fn words(&self) -> &[u64] {
        &self.bits
    }

    /// Membership test on a global TID.
    pub fn contains(&self, tid: Tid) -> bool {
        match self.range.local_offset(tid) {
            Ok(local) => bits::word_index(local, 0) < self.bits.len() && bits::get(&self.bits, 0, local),
            Err(_) => false,
        }
    }

    /// Global TIDs in ascending order.
    pub fn tids(&self) -> Vec<Tid> {
        bits::decode_ascending(&self.bits, 0)
            .into_iter()
            .map(|local| self.range.min + u64::from(local))
            .collect()
    }

    /// Metadata summary.
    pub fn describe(&self) -> TidSetSummary {
        TidSetSummary {
            rank: self.rank,
            cardinality: self.cardinality,
            min: self.min_elem,
            max: self.max_elem,
        }
    }

    /// Re-bases the set onto the global domain `[0, total_tids)`.
    ///
    /// # Errors
    ///
    /// Returns [`FimError::TidOutOfRange`] if the set's range reaches past
    /// `total_tids`, or [`FimError::CapacityExceeded`] if the domain is not
    /// addressable with `u32` bit indices.
    pub fn to_global_bits(&self, total_tids: u64) -> FimResult<TidBits> {
        if self.range.max >= total_tids {
            return Err(FimError::TidOutOfRange {
                tid: self.range.max,
                min: 0,
                max: total_tids.saturating_sub(1),
            });
        }
        let mut words = vec![0u64; bits::required_words(total_tids - 1, 0)?];
        bits::or_shifted(&mut words, &self.bits, self.range.min as usize);
        Ok(TidBits::from_words(words))
    }

    /// Merges two sets of the same rank coming from disjoint partitions.
    ///
    /// The words of the operand whose span starts lower are copied verbatim
    /// at the start of the result, the other operand's words are ORed in at
    /// the offset of its span minimum. The spans may interleave; only the
    /// owned ranges must be disjoint. Metadata is recombined without
    /// rescanning the bits.
    ///
    /// # Panics
    ///
    /// Panics if the ranks differ or two owned ranges overlap: both mean the
    /// upstream partitioning is broken.
    ///
    /// # Errors
    ///
    /// Returns [`FimError::CapacityExceeded`] if the merged span is not
    /// addressable.
    pub fn merge(self, other: Self) -> FimResult<Self> {
        assert_eq!(
            self.rank, other.rank,
            "cannot merge TID-sets of different ranks"
        );
        let owned = TidRange::union_disjoint(&self.owned, &other.owned);
        let (lower, higher) = if self.range.min <= other.range.min {
            (self, other)
        } else {
            (other, self)
        };

        let range = lower.range.hull(&higher.range);
        let mut words = vec![0u64; bits::required_words(range.max - range.min, 0)?];
        words[..lower.bits.len()].copy_from_slice(&lower.bits);
        // fits: the whole span passed the word-count check above
        let offset = (higher.range.min - range.min) as usize;
        bits::or_shifted(&mut words, &higher.bits, offset);

        trace!(
            "merged rank {} over [{}, {}]: {} + {} words",
            lower.rank,
            range.min,
            range.max,
            lower.bits.len(),
            higher.bits.len()
        );

        Ok(Self {
            rank: lower.rank,
            cardinality: lower.cardinality + higher.cardinality,
            min_elem: lower.min_elem.min(higher.min_elem),
            max_elem: lower.max_elem.max(higher.max_elem),
            range,
            owned,
            bits: words,
        })
    }

    /// Merge where either side may be absent; an absent side returns the
    /// other unchanged.
    pub fn merge_optional(a: Option<Self>, b: Option<Self>) -> FimResult<Option<Self>> {
        match (a, b) {
            (Some(a), Some(b)) => a.merge(b).map(Some),
            (a, None) => Ok(a),
            (None, b) => Ok(b),
        }
    }
}

/// One TID-set per rank for a partition, or for a merged run of partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTidIndex {
    total_ranks: usize,
    /// Sorted, disjoint partition ranges folded into this index.
    ranges: Vec<TidRange>,
    sets: Vec<Option<PartitionTidSet>>,
}

impl PartitionTidIndex {
    /// An index with no partitions folded in; the identity of [`merge`](Self::merge).
    pub fn empty(total_ranks: usize) -> Self {
        Self {
            total_ranks,
            ranges: Vec::new(),
            sets: vec![None; total_ranks],
        }
    }

    /// Builds the index of one partition.
    ///
    /// `rows` yields `(ranks, tid)` pairs; `range` must cover every TID and
    /// is normally computed beforehand with [`TidRange::scan`]. Bit-vectors
    /// are allocated lazily on a rank's first occurrence, sized to the
    /// partition span, and their metadata is computed once the rows are
    /// exhausted.
    ///
    /// # Errors
    ///
    /// - [`FimError::TidOutOfRange`] for a TID outside `range`
    /// - [`FimError::RankOutOfRange`] for a rank `>= total_ranks`
    /// - [`FimError::CapacityExceeded`] if the partition span is not addressable
    pub fn build<I, R>(rows: I, range: TidRange, total_ranks: usize) -> FimResult<Self>
    where
        I: IntoIterator<Item = (R, Tid)>,
        R: AsRef<[Rank]>,
    {
        let num_words = bits::required_words(range.max - range.min, 0)?;
        let mut sets: Vec<Option<PartitionTidSet>> = vec![None; total_ranks];
        let mut rows_seen = 0usize;

        for (ranks, tid) in rows {
            rows_seen += 1;
            let local = range.local_offset(tid)?;
            for &rank in ranks.as_ref() {
                let slot = sets
                    .get_mut(rank as usize)
                    .ok_or(FimError::RankOutOfRange {
                        rank,
                        total: total_ranks,
                    })?;
                match slot {
                    Some(set) => bits::set(&mut set.bits, 0, local),
                    None => {
                        *slot = Some(PartitionTidSet::with_first_elem(rank, range, num_words, local))
                    }
                }
            }
        }

        let mut present = 0usize;
        for set in sets.iter_mut().flatten() {
            set.refresh_metadata();
            present += 1;
        }
        debug!(
            "built partition [{}, {}]: {} rows, {} of {} ranks present",
            range.min, range.max, rows_seen, present, total_ranks
        );

        Ok(Self {
            total_ranks,
            ranges: if rows_seen > 0 { vec![range] } else { Vec::new() },
            sets,
        })
    }

    /// Scans the partition for its TID range, then builds it.
    ///
    /// An empty partition yields [`PartitionTidIndex::empty`].
    pub fn build_partition<R: AsRef<[Rank]>>(
        rows: &[(R, Tid)],
        total_ranks: usize,
    ) -> FimResult<Self> {
        match TidRange::scan(rows.iter().map(|(_, tid)| *tid)) {
            Some(range) => Self::build(rows.iter().map(|(r, t)| (r.as_ref(), *t)), range, total_ranks),
            None => Ok(Self::empty(total_ranks)),
        }
    }

    /// Merges the indexes of two disjoint partition runs, rank by rank.
    ///
    /// The runs need not be adjacent: merging the first and the last of
    /// three partitions and then the middle one gives the same index as any
    /// other order.
    ///
    /// # Panics
    ///
    /// Panics if the rank counts differ or two owned partition ranges
    /// overlap.
    pub fn merge(self, other: Self) -> FimResult<Self> {
        assert_eq!(
            self.total_ranks, other.total_ranks,
            "cannot merge indexes over different rank counts"
        );
        if other.ranges.is_empty() {
            return Ok(self);
        }
        if self.ranges.is_empty() {
            return Ok(other);
        }
        let ranges = TidRange::union_disjoint(&self.ranges, &other.ranges);

        let sets = self
            .sets
            .into_iter()
            .zip(other.sets)
            .map(|(x, y)| PartitionTidSet::merge_optional(x, y))
            .collect::<FimResult<Vec<_>>>()?;
        debug!(
            "merged partitions into {} owned range(s) over [{}, {}]",
            ranges.len(),
            ranges[0].min,
            ranges[ranges.len() - 1].max
        );

        Ok(Self {
            total_ranks: self.total_ranks,
            ranges,
            sets,
        })
    }

    /// Declared number of ranks.
    pub fn total_ranks(&self) -> usize {
        self.total_ranks
    }

    /// Hull of the owned TID ranges, `None` until a non-empty partition is
    /// folded in.
    pub fn range(&self) -> Option<TidRange> {
        match (self.ranges.first(), self.ranges.last()) {
            (Some(first), Some(last)) => Some(TidRange::new(first.min, last.max)),
            _ => None,
        }
    }

    /// The partition ranges folded into this index, sorted and disjoint.
    /// Ranges that touch are coalesced.
    pub fn owned_ranges(&self) -> &[TidRange] {
        &self.ranges
    }

    /// The set for `rank`, if the rank occurred.
    pub fn get(&self, rank: Rank) -> Option<&PartitionTidSet> {
        self.sets.get(rank as usize).and_then(Option::as_ref)
    }

    /// Iterates the sets of the ranks that occurred, in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &PartitionTidSet> {
        self.sets.iter().flatten()
    }

    /// Number of ranks that occurred.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true if no rank occurred.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Per-rank support counts (0 for absent ranks).
    pub fn supports(&self) -> Vec<u64> {
        self.sets
            .iter()
            .map(|s| s.as_ref().map_or(0, PartitionTidSet::cardinality))
            .collect()
    }

    /// Metadata of every present set.
    pub fn summaries(&self) -> Vec<TidSetSummary> {
        self.iter().map(PartitionTidSet::describe).collect()
    }

    /// Converts the index into global item coverage, indexed by rank.
    ///
    /// Absent ranks yield an empty set.
    pub fn into_coverage(self, total_tids: u64) -> FimResult<Vec<TidBits>> {
        self.sets
            .into_iter()
            .map(|set| match set {
                Some(set) => set.to_global_bits(total_tids),
                None => Ok(TidBits::new()),
            })
            .collect()
    }
}
