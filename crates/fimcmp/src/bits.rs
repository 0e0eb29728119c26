//! Word-packed bitset primitives.
//!
//! The free functions in this module operate on `u64` word slices with an
//! explicit base word offset, so a caller can keep a header in front of the
//! bit payload inside a single buffer. The offset is a precondition: it is not
//! validated, and an index past the end of the slice panics through normal
//! slice indexing.
//!
//! [`TidBits`] is the owned, base-0 form used by the miner for item coverage
//! and difference-sets.
//!
//! # Example
//!
//! ```rust
//! use fimcmp::bits::{self, TidBits};
//!
//! let mut words = vec![0u64; 2];
//! bits::set(&mut words, 0, 3);
//! bits::set(&mut words, 0, 70);
//! assert_eq!(bits::cardinality(&words, 0), 2);
//! assert_eq!(bits::decode_ascending(&words, 0), vec![3, 70]);
//!
//! let a: TidBits = [1u32, 2, 3].into_iter().collect();
//! let b: TidBits = [2u32].into_iter().collect();
//! assert_eq!(a.difference(&b).to_vec(), vec![1, 3]);
//! ```

use std::fmt;
use std::ops::Range;

use crate::error::{FimError, FimResult};

/// log2 of [`BITS_PER_WORD`].
pub const ADDRESS_BITS_PER_WORD: u32 = 6;

/// Number of bits held by a single word.
pub const BITS_PER_WORD: usize = 1 << ADDRESS_BITS_PER_WORD;

/// Index of the word holding `bit`, given a payload starting at `base`.
#[inline]
pub fn word_index(bit: u32, base: usize) -> usize {
    base + (bit >> ADDRESS_BITS_PER_WORD) as usize
}

/// Number of words (header included) needed to address bits `0..=max_bit`.
///
/// # Errors
///
/// Returns [`FimError::CapacityExceeded`] when `max_bit` does not fit the
/// `u32` bit-index width or the word count overflows `usize`.
pub fn required_words(max_bit: u64, base: usize) -> FimResult<usize> {
    let bit = u32::try_from(max_bit).map_err(|_| FimError::CapacityExceeded {
        what: "bit index",
        requested: max_bit,
    })?;
    base.checked_add(1 + (bit >> ADDRESS_BITS_PER_WORD) as usize)
        .ok_or(FimError::CapacityExceeded {
            what: "bit-vector word count",
            requested: max_bit,
        })
}

#[inline]
fn as_bit(bit: u32) -> u64 {
    1u64 << (bit & (BITS_PER_WORD as u32 - 1))
}

/// Sets `bit` in the payload starting at `base`.
#[inline]
pub fn set(words: &mut [u64], base: usize, bit: u32) {
    words[word_index(bit, base)] |= as_bit(bit);
}

/// Returns whether `bit` is set in the payload starting at `base`.
#[inline]
pub fn get(words: &[u64], base: usize, bit: u32) -> bool {
    words[word_index(bit, base)] & as_bit(bit) != 0
}

/// Number of set bits in the payload.
pub fn cardinality(words: &[u64], base: usize) -> u64 {
    words[base..].iter().map(|w| u64::from(w.count_ones())).sum()
}

/// Smallest set bit, or `None` if the payload is empty.
pub fn min(words: &[u64], base: usize) -> Option<u32> {
    words[base..]
        .iter()
        .enumerate()
        .find(|(_, &w)| w != 0)
        .map(|(i, &w)| (i * BITS_PER_WORD) as u32 + w.trailing_zeros())
}

/// Largest set bit, or `None` if the payload is empty.
pub fn max(words: &[u64], base: usize) -> Option<u32> {
    words[base..]
        .iter()
        .enumerate()
        .rev()
        .find(|(_, &w)| w != 0)
        .map(|(i, &w)| (i * BITS_PER_WORD) as u32 + (BITS_PER_WORD as u32 - 1) - w.leading_zeros())
}

/// Set bit positions in strictly ascending order.
pub fn decode_ascending(words: &[u64], base: usize) -> Vec<u32> {
    let mut out = Vec::with_capacity(cardinality(words, base) as usize);
    for (i, &word) in words[base..].iter().enumerate() {
        out.extend(WordBits::new(word, i));
    }
    out
}

/// In-place intersection over the payload words in `range`.
///
/// Payload words of `dst` outside `range` (up to the shorter of the two
/// payloads) are zero-filled, since the missing operand is treated as empty.
pub fn and(dst: &mut [u64], src: &[u64], base: usize, range: Range<usize>) {
    let common = dst.len().min(src.len()).saturating_sub(base);
    for i in 0..common {
        let at = base + i;
        if range.contains(&i) {
            dst[at] &= src[at];
        } else {
            dst[at] = 0;
        }
    }
}

/// In-place union over the payload words in `range`.
///
/// Payload words of `dst` outside `range` are left unchanged: the missing
/// operand is treated as empty, exactly as in [`and`], and OR with an empty
/// word is the identity.
pub fn or(dst: &mut [u64], src: &[u64], base: usize, range: Range<usize>) {
    let common = dst.len().min(src.len()).saturating_sub(base);
    let end = range.end.min(common);
    for i in range.start.min(end)..end {
        dst[base + i] |= src[base + i];
    }
}

/// Clears from `dst` every bit set in `src` (base 0, common prefix only).
pub fn and_not(dst: &mut [u64], src: &[u64]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d &= !s;
    }
}

/// Returns whether every bit of `a` is also set in `b` (base 0).
pub fn is_subset(a: &[u64], b: &[u64]) -> bool {
    a.iter()
        .enumerate()
        .all(|(i, &w)| w & !b.get(i).copied().unwrap_or(0) == 0)
}

/// ORs `src` into `dst`, shifting every source bit up by `bit_offset`.
///
/// When the offset is word-aligned this is a straight block copy; otherwise
/// each source word is split across two destination words. Either way the
/// cost is proportional to `src.len()`, not to the destination size.
pub fn or_shifted(dst: &mut [u64], src: &[u64], bit_offset: usize) {
    let word_off = bit_offset >> ADDRESS_BITS_PER_WORD;
    let shift = (bit_offset & (BITS_PER_WORD - 1)) as u32;
    if shift == 0 {
        for (d, &s) in dst[word_off..word_off + src.len()].iter_mut().zip(src) {
            *d |= s;
        }
        return;
    }
    for (i, &word) in src.iter().enumerate() {
        if word == 0 {
            continue;
        }
        let at = word_off + i;
        dst[at] |= word << shift;
        let carry = word >> (BITS_PER_WORD as u32 - shift);
        if carry != 0 {
            dst[at + 1] |= carry;
        }
    }
}

/// Iterator over the set bits of one word.
struct WordBits {
    word: u64,
    base: u32,
}

impl WordBits {
    #[inline]
    fn new(word: u64, word_pos: usize) -> Self {
        Self {
            word,
            base: (word_pos * BITS_PER_WORD) as u32,
        }
    }
}

impl Iterator for WordBits {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        if self.word == 0 {
            return None;
        }
        let bit = self.word.trailing_zeros();
        self.word &= self.word - 1;
        Some(self.base + bit)
    }
}

/// An owned bit-vector of TIDs (or partition-local TID offsets).
///
/// Equality is logical: trailing zero words do not make two sets differ.
#[derive(Clone, Default)]
pub struct TidBits {
    words: Vec<u64>,
}

impl TidBits {
    /// Creates an empty set with no storage.
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Creates an empty set able to hold bits `0..num_bits` without growing.
    pub fn with_capacity(num_bits: usize) -> Self {
        Self {
            words: vec![0; num_bits.div_ceil(BITS_PER_WORD)],
        }
    }

    /// Creates the set `{0, 1, ..., num_bits - 1}`.
    pub fn full(num_bits: usize) -> Self {
        let mut words = vec![u64::MAX; num_bits.div_ceil(BITS_PER_WORD)];
        let rem = num_bits % BITS_PER_WORD;
        if rem != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << rem) - 1;
            }
        }
        Self { words }
    }

    /// Wraps raw words (bit `i` of word `w` is element `64 * w + i`).
    pub fn from_words(words: Vec<u64>) -> Self {
        Self { words }
    }

    /// Raw word view.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Inserts `bit`, growing the storage if needed.
    pub fn insert(&mut self, bit: u32) {
        let at = word_index(bit, 0);
        if at >= self.words.len() {
            self.words.resize(at + 1, 0);
        }
        set(&mut self.words, 0, bit);
    }

    /// Membership test; bits beyond the storage are absent.
    #[inline]
    pub fn contains(&self, bit: u32) -> bool {
        word_index(bit, 0) < self.words.len() && get(&self.words, 0, bit)
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> u64 {
        cardinality(&self.words, 0)
    }

    /// Returns true if no bit is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Smallest element.
    pub fn min(&self) -> Option<u32> {
        min(&self.words, 0)
    }

    /// Largest element.
    pub fn max(&self) -> Option<u32> {
        max(&self.words, 0)
    }

    /// Elements in ascending order.
    pub fn to_vec(&self) -> Vec<u32> {
        decode_ascending(&self.words, 0)
    }

    /// Iterates elements in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(i, &w)| WordBits::new(w, i))
    }

    /// Returns `self \ other`.
    pub fn difference(&self, other: &TidBits) -> TidBits {
        let mut words = self.words.clone();
        and_not(&mut words, &other.words);
        Self { words }
    }

    /// Returns whether every element of `self` is in `other`.
    #[inline]
    pub fn is_subset_of(&self, other: &TidBits) -> bool {
        is_subset(&self.words, &other.words)
    }

    /// Stable 64-bit fingerprint of the set content (FNV-1a over the
    /// non-zero words and their positions). Equal sets have equal
    /// fingerprints regardless of storage length.
    pub fn fingerprint(&self) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
        let mut hash = FNV_OFFSET;
        for (i, &word) in self.words.iter().enumerate() {
            if word == 0 {
                continue;
            }
            for byte in (i as u64).to_le_bytes().into_iter().chain(word.to_le_bytes()) {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        }
        hash
    }
}

impl PartialEq for TidBits {
    fn eq(&self, other: &Self) -> bool {
        let (short, long) = if self.words.len() <= other.words.len() {
            (&self.words, &other.words)
        } else {
            (&other.words, &self.words)
        };
        short[..] == long[..short.len()] && long[short.len()..].iter().all(|&w| w == 0)
    }
}

impl Eq for TidBits {}

impl FromIterator<u32> for TidBits {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut bits = TidBits::new();
        for bit in iter {
            bits.insert(bit);
        }
        bits
    }
}

impl fmt::Debug for TidBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
