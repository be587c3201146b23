//! Population bitmap for bitmap-indexed trie nodes.
//!
//! A [`Bitmap`] records which of the 32 logical slots of a branch node are
//! occupied. Children are stored compacted, so the array index of a slot is
//! the number of occupied slots below it.

/// Bits of hash consumed per trie level.
pub const BITS_PER_LEVEL: u32 = 5;

/// Number of logical slots per branch node (2^5).
pub const BRANCHING_FACTOR: usize = 1 << BITS_PER_LEVEL;

/// Mask extracting one 5-bit digit.
const MASK: u32 = (1 << BITS_PER_LEVEL) - 1;

/// Width of the hash fed to the trie.
pub const HASH_BITS: u32 = u32::BITS;

/// A 32-bit occupancy bitmap.
///
/// All operations are pure and return a new value.
///
/// # Examples
///
/// ```rust
/// use immutable_collections::persistent::Bitmap;
///
/// let bitmap = Bitmap::EMPTY
///     .next(Bitmap::bitpos(3, 0))
///     .next(Bitmap::bitpos(9, 0));
///
/// assert!(bitmap.has(Bitmap::bitpos(9, 0)));
/// assert_eq!(bitmap.index(Bitmap::bitpos(9, 0)), 1);
/// assert_eq!(bitmap.count(), 2);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bitmap(u32);

impl Bitmap {
    /// A bitmap with no slot occupied.
    pub const EMPTY: Self = Self(0);

    /// Wraps a raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Extracts the 5-bit digit of `hash` at `shift`.
    #[inline]
    #[must_use]
    pub const fn digit(hash: u32, shift: u32) -> u32 {
        (hash >> shift) & MASK
    }

    /// Returns the one-hot bit for the digit of `hash` at `shift`.
    ///
    /// `shift` must be a multiple of [`BITS_PER_LEVEL`] below 32.
    #[inline]
    #[must_use]
    pub const fn bitpos(hash: u32, shift: u32) -> Self {
        Self(1 << Self::digit(hash, shift))
    }

    /// Returns this bitmap with `bitpos` set.
    #[inline]
    #[must_use]
    pub const fn next(self, bitpos: Self) -> Self {
        Self(self.0 | bitpos.0)
    }

    /// Returns this bitmap with `bitpos` cleared.
    #[inline]
    #[must_use]
    pub const fn without(self, bitpos: Self) -> Self {
        Self(self.0 & !bitpos.0)
    }

    /// Returns `true` if the single bit `bitpos` is set.
    #[inline]
    #[must_use]
    pub const fn has(self, bitpos: Self) -> bool {
        self.0 & bitpos.0 != 0
    }

    /// Number of set bits strictly below `bitpos`.
    ///
    /// This is the position of the slot in the compacted child array.
    #[inline]
    #[must_use]
    pub const fn index(self, bitpos: Self) -> usize {
        (self.0 & bitpos.0.wrapping_sub(1)).count_ones() as usize
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0b00000, 0, 0)]
    #[case(0b11111, 0, 31)]
    #[case(0b1_00000, 5, 1)]
    #[case(0xC000_0000, 30, 3)]
    fn test_digit(#[case] hash: u32, #[case] shift: u32, #[case] expected: u32) {
        assert_eq!(Bitmap::digit(hash, shift), expected);
    }

    #[rstest]
    fn test_bitpos_is_one_hot() {
        assert_eq!(Bitmap::bitpos(0, 0).bits(), 1);
        assert_eq!(Bitmap::bitpos(31, 0).bits(), 1 << 31);
        assert_eq!(Bitmap::bitpos(0b10_00000, 5).bits(), 1 << 2);
    }

    #[rstest]
    fn test_next_and_without_are_pure() {
        let original = Bitmap::EMPTY.next(Bitmap::bitpos(4, 0));
        let extended = original.next(Bitmap::bitpos(7, 0));
        let reduced = extended.without(Bitmap::bitpos(4, 0));

        assert_eq!(original.bits(), 1 << 4);
        assert_eq!(extended.bits(), (1 << 4) | (1 << 7));
        assert_eq!(reduced.bits(), 1 << 7);
    }

    #[rstest]
    fn test_index_counts_lower_bits() {
        let bitmap = Bitmap::from_bits(0b1011_0010);
        assert_eq!(bitmap.index(Bitmap::from_bits(1 << 1)), 0);
        assert_eq!(bitmap.index(Bitmap::from_bits(1 << 4)), 1);
        assert_eq!(bitmap.index(Bitmap::from_bits(1 << 5)), 2);
        assert_eq!(bitmap.index(Bitmap::from_bits(1 << 7)), 3);
        assert_eq!(bitmap.index(Bitmap::from_bits(1 << 31)), 4);
    }

    #[rstest]
    fn test_top_bit() {
        let bitmap = Bitmap::from_bits(u32::MAX);
        assert_eq!(bitmap.index(Bitmap::from_bits(1 << 31)), 31);
        assert_eq!(bitmap.count(), BRANCHING_FACTOR);
    }

    proptest! {
        #[test]
        fn prop_index_matches_naive_count(bits in any::<u32>(), slot in 0u32..32) {
            let bitmap = Bitmap::from_bits(bits);
            let naive = (0..slot).filter(|bit| bits & (1 << bit) != 0).count();
            prop_assert_eq!(bitmap.index(Bitmap::from_bits(1 << slot)), naive);
        }

        #[test]
        fn prop_has_after_next(bits in any::<u32>(), hash in any::<u32>(), level in 0u32..7) {
            let shift = level * BITS_PER_LEVEL;
            let bitpos = Bitmap::bitpos(hash, shift);
            let bitmap = Bitmap::from_bits(bits);
            prop_assert!(bitmap.next(bitpos).has(bitpos));
            prop_assert!(!bitmap.without(bitpos).has(bitpos));
        }
    }
}
