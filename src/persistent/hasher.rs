//! 32-bit key hashing for the hash array mapped trie.
//!
//! Every key stored in an [`ImmutableMap`](super::ImmutableMap) or
//! [`ImmutableSet`](super::ImmutableSet) is reduced to a `u32` by a
//! [`KeyHasher`]. The default strategy, [`DefaultKeyHasher`], dispatches on
//! the key type through the [`KeyHash`] trait:
//!
//! | Kind of key                      | Hash                                              |
//! |----------------------------------|---------------------------------------------------|
//! | `str`, `String`, `char`          | xxHash32 (seed 0) followed by [`avalanche`]       |
//! | integers, floats                 | the value's own bit pattern, unmixed              |
//! | `bool`                           | `1` or `0`                                        |
//! | `()`, `None`                     | `0`                                               |
//! | slices, vectors, tuples, lists   | string hash of the comma-joined element hashes    |
//! | records ([`RecordHasher`])       | string hash of `Type{field:avalanche(hash),...}`  |
//! | opaque values ([`hash_text`])    | string hash of the `Display` text                 |
//!
//! Hashes are deterministic for the lifetime of the process. They are not
//! promised to be stable across versions of this crate.
//!
//! # Key identity
//!
//! Inside the trie two keys are the same key exactly when their hashes are
//! equal. Keys that are equal under `PartialEq` must therefore hash equally,
//! and a custom [`KeyHash`] implementation that breaks this makes lookups
//! fail silently. Integer keys hash to themselves, which keeps sequential
//! keys collision free but offers no protection against adversarial input.
//!
//! # Examples
//!
//! ```rust
//! use immutable_collections::persistent::{KeyHash, RecordHasher};
//!
//! assert_eq!(42_i32.key_hash(), 42);
//! assert_eq!(true.key_hash(), 1);
//! assert_eq!("key1".key_hash(), String::from("key1").key_hash());
//!
//! let point = RecordHasher::new("Point").field("y", &2).field("x", &1).finish();
//! let same = RecordHasher::new("Point").field("x", &1).field("y", &2).finish();
//! assert_eq!(point, same);
//! ```

use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

// =============================================================================
// xxHash32
// =============================================================================

const PRIME_1: u32 = 0x9E37_79B1;
const PRIME_2: u32 = 0x85EB_CA77;
const PRIME_3: u32 = 0xC2B2_AE3D;
const PRIME_4: u32 = 0x27D4_EB2F;
const PRIME_5: u32 = 0x1656_67B1;

const AVALANCHE_1: u32 = 0x85EB_CA6B;
const AVALANCHE_2: u32 = 0xC2B2_AE35;

const STRIPE_LENGTH: usize = 16;

#[inline]
const fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
const fn round(accumulator: u32, lane: u32) -> u32 {
    accumulator
        .wrapping_add(lane.wrapping_mul(PRIME_2))
        .rotate_left(13)
        .wrapping_mul(PRIME_1)
}

/// Computes the xxHash32 digest of `input`.
///
/// Input is consumed in 16-byte stripes by four interleaved accumulators,
/// the tail is folded four bytes and then one byte at a time, and the
/// result goes through the xxHash finalizer.
///
/// # Examples
///
/// ```rust
/// use immutable_collections::persistent::xxhash32;
///
/// assert_eq!(xxhash32(b"", 0), 0x02CC_5D05);
/// assert_eq!(xxhash32(b"abc", 0), 0x32D1_53FF);
/// ```
#[must_use]
pub fn xxhash32(input: &[u8], seed: u32) -> u32 {
    let length = input.len();
    let mut rest = input;

    let mut hash = if length >= STRIPE_LENGTH {
        let mut lane_1 = seed.wrapping_add(PRIME_1).wrapping_add(PRIME_2);
        let mut lane_2 = seed.wrapping_add(PRIME_2);
        let mut lane_3 = seed;
        let mut lane_4 = seed.wrapping_sub(PRIME_1);

        while rest.len() >= STRIPE_LENGTH {
            lane_1 = round(lane_1, read_u32(rest, 0));
            lane_2 = round(lane_2, read_u32(rest, 4));
            lane_3 = round(lane_3, read_u32(rest, 8));
            lane_4 = round(lane_4, read_u32(rest, 12));
            rest = &rest[STRIPE_LENGTH..];
        }

        lane_1
            .rotate_left(1)
            .wrapping_add(lane_2.rotate_left(7))
            .wrapping_add(lane_3.rotate_left(12))
            .wrapping_add(lane_4.rotate_left(18))
    } else {
        seed.wrapping_add(PRIME_5)
    };

    // Only the low 32 bits of the length take part, as in the reference.
    #[allow(clippy::cast_possible_truncation)]
    {
        hash = hash.wrapping_add(length as u32);
    }

    let mut words = rest.chunks_exact(4);
    for word in &mut words {
        hash = hash
            .wrapping_add(read_u32(word, 0).wrapping_mul(PRIME_3))
            .rotate_left(17)
            .wrapping_mul(PRIME_4);
    }
    for &byte in words.remainder() {
        hash = hash
            .wrapping_add(u32::from(byte).wrapping_mul(PRIME_5))
            .rotate_left(11)
            .wrapping_mul(PRIME_1);
    }

    hash ^= hash >> 15;
    hash = hash.wrapping_mul(PRIME_2);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(PRIME_3);
    hash ^= hash >> 16;
    hash
}

/// Extra dispersion pass applied on top of a finished hash.
///
/// # Examples
///
/// ```rust
/// use immutable_collections::persistent::avalanche;
///
/// assert_eq!(avalanche(0), 0);
/// assert_ne!(avalanche(1), avalanche(2));
/// ```
#[inline]
#[must_use]
pub const fn avalanche(mut hash: u32) -> u32 {
    hash ^= hash >> 16;
    hash = hash.wrapping_mul(AVALANCHE_1);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(AVALANCHE_2);
    hash ^= hash >> 16;
    hash
}

/// Hashes a string: xxHash32 over its UTF-8 bytes, then [`avalanche`].
#[inline]
#[must_use]
pub fn hash_string(text: &str) -> u32 {
    avalanche(xxhash32(text.as_bytes(), 0))
}

/// Hashes an opaque value by its textual representation.
///
/// # Examples
///
/// ```rust
/// use immutable_collections::persistent::{hash_string, hash_text};
///
/// let address = std::net::Ipv4Addr::new(127, 0, 0, 1);
/// assert_eq!(hash_text(&address), hash_string("127.0.0.1"));
/// ```
#[must_use]
pub fn hash_text(value: &dyn fmt::Display) -> u32 {
    hash_string(&value.to_string())
}

/// Hashes an ordered sequence from the hashes of its elements.
///
/// The element hashes are joined with `,` in order and the result is
/// string-hashed, so the hash is order sensitive.
///
/// # Examples
///
/// ```rust
/// use immutable_collections::persistent::{KeyHash, hash_sequence};
///
/// assert_eq!(vec![1, 2, 3].key_hash(), hash_sequence([1, 2, 3]));
/// assert_ne!(hash_sequence([1, 2]), hash_sequence([2, 1]));
/// ```
#[must_use]
pub fn hash_sequence<I>(element_hashes: I) -> u32
where
    I: IntoIterator<Item = u32>,
{
    let mut text = String::new();
    for (index, hash) in element_hashes.into_iter().enumerate() {
        if index > 0 {
            text.push(',');
        }
        text.push_str(&hash.to_string());
    }
    hash_string(&text)
}

#[inline]
const fn fold_u64(bits: u64) -> u32 {
    #[allow(clippy::cast_possible_truncation)]
    let folded = (bits as u32) ^ ((bits >> 32) as u32);
    folded
}

#[inline]
const fn fold_u128(bits: u128) -> u32 {
    #[allow(clippy::cast_possible_truncation)]
    let folded = fold_u64(bits as u64) ^ fold_u64((bits >> 64) as u64);
    folded
}

// =============================================================================
// KeyHash
// =============================================================================

/// Types that know their 32-bit trie hash.
///
/// Implementations must agree with `PartialEq`: equal values hash equally.
///
/// # Examples
///
/// ```rust
/// use immutable_collections::persistent::{KeyHash, RecordHasher};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl KeyHash for Point {
///     fn key_hash(&self) -> u32 {
///         RecordHasher::new("Point")
///             .field("x", &self.x)
///             .field("y", &self.y)
///             .finish()
///     }
/// }
///
/// assert_eq!(Point { x: 1, y: 2 }.key_hash(), Point { x: 1, y: 2 }.key_hash());
/// ```
pub trait KeyHash {
    /// Returns the 32-bit hash of this value.
    fn key_hash(&self) -> u32;
}

impl KeyHash for str {
    #[inline]
    fn key_hash(&self) -> u32 {
        hash_string(self)
    }
}

impl KeyHash for String {
    #[inline]
    fn key_hash(&self) -> u32 {
        hash_string(self)
    }
}

impl KeyHash for char {
    fn key_hash(&self) -> u32 {
        let mut buffer = [0u8; 4];
        hash_string(self.encode_utf8(&mut buffer))
    }
}

macro_rules! impl_key_hash_for_narrow_integer {
    ($($integer:ty),*) => {
        $(
            impl KeyHash for $integer {
                #[inline]
                #[allow(clippy::cast_sign_loss, clippy::cast_lossless)]
                fn key_hash(&self) -> u32 {
                    *self as u32
                }
            }
        )*
    };
}

impl_key_hash_for_narrow_integer!(u8, u16, u32, i8, i16, i32);

impl KeyHash for u64 {
    #[inline]
    fn key_hash(&self) -> u32 {
        u32::try_from(*self).unwrap_or_else(|_| fold_u64(*self))
    }
}

impl KeyHash for i64 {
    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn key_hash(&self) -> u32 {
        i32::try_from(*self).map_or_else(|_| fold_u64(*self as u64), |narrow| narrow as u32)
    }
}

impl KeyHash for u128 {
    #[inline]
    fn key_hash(&self) -> u32 {
        u32::try_from(*self).unwrap_or_else(|_| fold_u128(*self))
    }
}

impl KeyHash for i128 {
    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn key_hash(&self) -> u32 {
        i32::try_from(*self).map_or_else(|_| fold_u128(*self as u128), |narrow| narrow as u32)
    }
}

impl KeyHash for usize {
    #[inline]
    fn key_hash(&self) -> u32 {
        (*self as u64).key_hash()
    }
}

impl KeyHash for isize {
    #[inline]
    fn key_hash(&self) -> u32 {
        (*self as i64).key_hash()
    }
}

impl KeyHash for f32 {
    #[inline]
    fn key_hash(&self) -> u32 {
        f64::from(*self).key_hash()
    }
}

impl KeyHash for f64 {
    #[allow(
        clippy::float_cmp,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn key_hash(&self) -> u32 {
        let value = *self;
        let lowest = Self::from(i32::MIN);
        let highest = Self::from(i32::MAX);
        if value.trunc() == value && value >= lowest && value <= highest {
            value as i32 as u32
        } else {
            fold_u64(value.to_bits())
        }
    }
}

impl KeyHash for bool {
    #[inline]
    fn key_hash(&self) -> u32 {
        u32::from(*self)
    }
}

impl KeyHash for () {
    #[inline]
    fn key_hash(&self) -> u32 {
        0
    }
}

impl<T: KeyHash> KeyHash for Option<T> {
    #[inline]
    fn key_hash(&self) -> u32 {
        self.as_ref().map_or(0, KeyHash::key_hash)
    }
}

impl<T: KeyHash> KeyHash for [T] {
    fn key_hash(&self) -> u32 {
        hash_sequence(self.iter().map(KeyHash::key_hash))
    }
}

impl<T: KeyHash, const N: usize> KeyHash for [T; N] {
    fn key_hash(&self) -> u32 {
        self.as_slice().key_hash()
    }
}

impl<T: KeyHash> KeyHash for Vec<T> {
    fn key_hash(&self) -> u32 {
        self.as_slice().key_hash()
    }
}

impl<T: KeyHash> KeyHash for VecDeque<T> {
    fn key_hash(&self) -> u32 {
        hash_sequence(self.iter().map(KeyHash::key_hash))
    }
}

macro_rules! impl_key_hash_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: KeyHash),+> KeyHash for ($($name,)+) {
            #[allow(non_snake_case)]
            fn key_hash(&self) -> u32 {
                let ($($name,)+) = self;
                hash_sequence([$($name.key_hash()),+])
            }
        }
    };
}

impl_key_hash_for_tuple!(A, B);
impl_key_hash_for_tuple!(A, B, C);
impl_key_hash_for_tuple!(A, B, C, D);

impl<T: KeyHash + ?Sized> KeyHash for &T {
    #[inline]
    fn key_hash(&self) -> u32 {
        (**self).key_hash()
    }
}

impl<T: KeyHash + ?Sized> KeyHash for Box<T> {
    #[inline]
    fn key_hash(&self) -> u32 {
        (**self).key_hash()
    }
}

impl<T: KeyHash + ?Sized> KeyHash for Rc<T> {
    #[inline]
    fn key_hash(&self) -> u32 {
        (**self).key_hash()
    }
}

impl<T: KeyHash + ?Sized> KeyHash for Arc<T> {
    #[inline]
    fn key_hash(&self) -> u32 {
        (**self).key_hash()
    }
}

// =============================================================================
// Records
// =============================================================================

/// Builds the hash of a structured value from its named fields.
///
/// The hash is the string hash of `Type{name:avalanche(hash),...}`. Field
/// names are sorted before the string is built, so the order in which
/// fields are supplied does not matter.
#[derive(Debug, Clone)]
pub struct RecordHasher<'a> {
    discriminator: Cow<'a, str>,
    fields: Vec<(Cow<'a, str>, u32)>,
}

impl<'a> RecordHasher<'a> {
    /// Starts a record with the given type discriminator.
    #[must_use]
    pub fn new(discriminator: impl Into<Cow<'a, str>>) -> Self {
        Self {
            discriminator: discriminator.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a named field.
    #[must_use]
    pub fn field<T: KeyHash + ?Sized>(self, name: impl Into<Cow<'a, str>>, value: &T) -> Self {
        self.field_hash(name, value.key_hash())
    }

    /// Adds a named field whose hash is already known.
    #[must_use]
    pub fn field_hash(mut self, name: impl Into<Cow<'a, str>>, hash: u32) -> Self {
        self.fields.push((name.into(), hash));
        self
    }

    /// Finishes the record and returns its hash.
    #[must_use]
    pub fn finish(mut self) -> u32 {
        self.fields.sort_by(|left, right| left.0.cmp(&right.0));

        let mut text = String::with_capacity(self.discriminator.len() + self.fields.len() * 16);
        text.push_str(&self.discriminator);
        text.push('{');
        for (index, (name, hash)) in self.fields.iter().enumerate() {
            if index > 0 {
                text.push(',');
            }
            text.push_str(name);
            text.push(':');
            text.push_str(&avalanche(*hash).to_string());
        }
        text.push('}');
        hash_string(&text)
    }
}

/// Implements [`KeyHash`] for a struct by hashing it as a record of the
/// listed fields.
///
/// # Examples
///
/// ```rust
/// use immutable_collections::impl_record_key_hash;
/// use immutable_collections::persistent::KeyHash;
///
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// impl_record_key_hash!(User { name, age });
///
/// let first = User { name: "ada".to_string(), age: 36 };
/// let second = User { name: "ada".to_string(), age: 36 };
/// assert_eq!(first.key_hash(), second.key_hash());
/// ```
#[macro_export]
macro_rules! impl_record_key_hash {
    ($type:ident { $($field:ident),* $(,)? }) => {
        impl $crate::persistent::KeyHash for $type {
            fn key_hash(&self) -> u32 {
                $crate::persistent::RecordHasher::new(stringify!($type))
                    $(.field(stringify!($field), &self.$field))*
                    .finish()
            }
        }
    };
}

// =============================================================================
// KeyHasher
// =============================================================================

/// A hashing strategy used by maps and sets.
///
/// The default strategy defers to [`KeyHash`]. Supplying another strategy
/// through `with_hasher` changes how keys are placed in the trie; tests use
/// this to force collisions.
///
/// # Examples
///
/// ```rust
/// use immutable_collections::persistent::{ImmutableMap, KeyHasher};
///
/// #[derive(Clone)]
/// struct LengthHasher;
///
/// impl KeyHasher<str> for LengthHasher {
///     fn hash_key(&self, key: &str) -> u32 {
///         key.len() as u32
///     }
/// }
///
/// impl KeyHasher<String> for LengthHasher {
///     fn hash_key(&self, key: &String) -> u32 {
///         key.len() as u32
///     }
/// }
///
/// let map = ImmutableMap::with_hasher(LengthHasher)
///     .add("ab".to_string(), 1)
///     .add("cd".to_string(), 2);
///
/// // Same length, same hash: the second write wins.
/// assert_eq!(map.size(), 1);
/// assert_eq!(map.get("ab").to_option(), Some(&2));
/// ```
pub trait KeyHasher<K: ?Sized> {
    /// Returns the 32-bit hash of `key`.
    fn hash_key(&self, key: &K) -> u32;
}

/// The default hashing strategy, dispatching through [`KeyHash`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DefaultKeyHasher;

impl<K: KeyHash + ?Sized> KeyHasher<K> for DefaultKeyHasher {
    #[inline]
    fn hash_key(&self, key: &K) -> u32 {
        key.key_hash()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"", 0x02CC_5D05)]
    #[case(b"abc", 0x32D1_53FF)]
    fn test_xxhash32_reference_vectors(#[case] input: &[u8], #[case] expected: u32) {
        assert_eq!(xxhash32(input, 0), expected);
    }

    #[rstest]
    fn test_xxhash32_long_input_uses_all_bytes() {
        let base = b"0123456789abcdef0123456789abcdef!".to_vec();
        let mut changed = base.clone();
        changed[3] = b'X';
        assert_ne!(xxhash32(&base, 0), xxhash32(&changed, 0));

        let mut tail_changed = base.clone();
        if let Some(last) = tail_changed.last_mut() {
            *last = b'?';
        }
        assert_ne!(xxhash32(&base, 0), xxhash32(&tail_changed, 0));
    }

    #[rstest]
    fn test_xxhash32_seed_changes_result() {
        assert_ne!(xxhash32(b"seeded", 0), xxhash32(b"seeded", 1));
    }

    #[rstest]
    #[case("key1", "key1")]
    #[case("", "")]
    #[case(
        "a longer string that spans stripes",
        "a longer string that spans stripes"
    )]
    fn test_same_strings_hash_equal(#[case] left: &str, #[case] right: &str) {
        assert_eq!(left.key_hash(), right.to_string().key_hash());
    }

    #[rstest]
    #[case("key1", "key2")]
    #[case("1", "2")]
    #[case("10", "01")]
    #[case("a", "b")]
    fn test_different_strings_hash_differently(#[case] left: &str, #[case] right: &str) {
        assert_ne!(left.key_hash(), right.key_hash());
    }

    #[rstest]
    fn test_small_integers_hash_to_themselves() {
        for value in 0..1000_i32 {
            assert_eq!(value.key_hash(), value as u32);
        }
        assert_eq!(7_u8.key_hash(), 7);
        assert_eq!(7_i64.key_hash(), 7);
        assert_eq!(7_usize.key_hash(), 7);
    }

    #[rstest]
    fn test_negative_integers_keep_bit_pattern() {
        assert_eq!((-1_i32).key_hash(), u32::MAX);
        assert_eq!((-1_i64).key_hash(), u32::MAX);
        assert_eq!((-1_i8).key_hash(), u32::MAX);
    }

    #[rstest]
    fn test_wide_integers_fold() {
        let wide: u64 = (5 << 32) | 3;
        assert_eq!(wide.key_hash(), 5 ^ 3);
    }

    #[rstest]
    fn test_integral_floats_hash_like_integers() {
        assert_eq!(1.0_f64.key_hash(), 1_i32.key_hash());
        assert_eq!((-3.0_f64).key_hash(), (-3_i32).key_hash());
        assert_eq!(2.0_f32.key_hash(), 2);
        assert_ne!(1.5_f64.key_hash(), 1.0_f64.key_hash());
    }

    #[rstest]
    fn test_bool_unit_and_none() {
        assert_eq!(true.key_hash(), 1);
        assert_eq!(false.key_hash(), 0);
        assert_eq!(().key_hash(), 0);
        assert_eq!(None::<i32>.key_hash(), 0);
        assert_eq!(Some(9).key_hash(), 9);
    }

    #[rstest]
    fn test_char_hashes_like_single_character_string() {
        assert_eq!('x'.key_hash(), "x".key_hash());
    }

    #[rstest]
    fn test_sequences_are_order_sensitive() {
        assert_eq!(vec![1, 2, 3].key_hash(), [1, 2, 3].key_hash());
        assert_ne!(vec![1, 2, 3].key_hash(), vec![3, 2, 1].key_hash());
        assert_eq!((1, "a").key_hash(), hash_sequence([1, "a".key_hash()]));
    }

    #[rstest]
    fn test_nested_sequences_recurse() {
        let nested = vec![vec![1, 2], vec![3]];
        let expected = hash_sequence([hash_sequence([1, 2]), hash_sequence([3])]);
        assert_eq!(nested.key_hash(), expected);
    }

    #[rstest]
    fn test_record_field_order_is_irrelevant() {
        let first = RecordHasher::new("Point")
            .field("x", &1)
            .field("y", &2)
            .finish();
        let second = RecordHasher::new("Point")
            .field("y", &2)
            .field("x", &1)
            .finish();
        assert_eq!(first, second);
    }

    #[rstest]
    fn test_record_discriminator_and_values_matter() {
        let point = RecordHasher::new("Point").field("x", &1).finish();
        let vector = RecordHasher::new("Vector").field("x", &1).finish();
        let moved = RecordHasher::new("Point").field("x", &2).finish();
        assert_ne!(point, vector);
        assert_ne!(point, moved);
    }

    #[rstest]
    fn test_record_text_layout() {
        let hash = RecordHasher::new("Point").field("x", &1).finish();
        let expected = hash_string(&format!("Point{{x:{}}}", avalanche(1)));
        assert_eq!(hash, expected);
    }

    struct Account {
        owner: String,
        balance: i64,
    }

    impl_record_key_hash!(Account { owner, balance });

    #[rstest]
    fn test_record_macro() {
        let first = Account {
            owner: "grace".to_string(),
            balance: 10,
        };
        let second = Account {
            owner: "grace".to_string(),
            balance: 10,
        };
        let third = Account {
            owner: "grace".to_string(),
            balance: 11,
        };
        assert_eq!(first.key_hash(), second.key_hash());
        assert_ne!(first.key_hash(), third.key_hash());
    }

    #[rstest]
    fn test_smart_pointers_delegate() {
        let text = "shared";
        assert_eq!(Rc::new(text.to_string()).key_hash(), text.key_hash());
        assert_eq!(Arc::<str>::from(text).key_hash(), text.key_hash());
        assert_eq!(Box::new(5_u32).key_hash(), 5);
    }

    #[rstest]
    fn test_default_key_hasher_uses_key_hash() {
        assert_eq!(DefaultKeyHasher.hash_key("abc"), "abc".key_hash());
        assert_eq!(DefaultKeyHasher.hash_key(&12_u16), 12);
    }

    #[rstest]
    fn test_short_numeric_strings_disperse() {
        let mut hashes: Vec<u32> = (0..1000)
            .map(|index: i32| index.to_string().key_hash())
            .collect();
        hashes.sort_unstable();
        hashes.dedup();
        assert_eq!(hashes.len(), 1000);

        let mut first_digits: Vec<u32> = (0..1000)
            .map(|index: i32| index.to_string().key_hash() & 0x1F)
            .collect();
        first_digits.sort_unstable();
        first_digits.dedup();
        assert_eq!(first_digits.len(), 32);
    }
}
