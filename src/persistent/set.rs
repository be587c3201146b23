//! Persistent (immutable) hash set based on HAMT.
//!
//! This module provides [`ImmutableSet`], an immutable hash set backed by
//! [`ImmutableMap`] with unit values.
//!
//! # Examples
//!
//! ```rust
//! use immutable_collections::persistent::ImmutableSet;
//!
//! let set = ImmutableSet::from_array([1, 2, 2, 3]);
//! assert_eq!(set.size(), 3);
//! assert!(set.contains(&2));
//! assert!(!set.remove(&2).contains(&2));
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::iter::{FromIterator, FusedIterator};

use super::map::ImmutableMapIterator;
use super::{
    DefaultKeyHasher, ImmutableList, ImmutableMap, IndexedSequence, KeyHash, KeyHasher,
    RecordHasher,
};
use crate::capability::{Constructible, HasToArray};
use crate::conversions;
use crate::optional::Optional;

// =============================================================================
// ImmutableSet Definition
// =============================================================================

/// A persistent (immutable) hash set based on HAMT.
///
/// Elements are identified by their 32-bit hash, so adding an element
/// whose hash is already present replaces the stored element.
///
/// # Time Complexity
///
/// | Operation  | Complexity |
/// |------------|------------|
/// | `new`      | O(1)       |
/// | `contains` | O(log32 N) |
/// | `add`      | O(log32 N) |
/// | `remove`   | O(log32 N) |
/// | `size`     | O(1)       |
///
/// # Examples
///
/// ```rust
/// use immutable_collections::persistent::ImmutableSet;
///
/// let set = ImmutableSet::new().add(1).add(2).add(3);
/// assert!(set.contains(&1));
/// assert_eq!(set.size(), 3);
/// ```
pub struct ImmutableSet<T, S = DefaultKeyHasher> {
    inner: ImmutableMap<T, (), S>,
}

impl<T> ImmutableSet<T> {
    /// Creates a new empty set.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: ImmutableMap::new(),
        }
    }

    /// Alias of [`ImmutableSet::new`].
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self::new()
    }
}

impl<T: KeyHash + PartialEq> ImmutableSet<T> {
    /// Creates a set containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().add(element)
    }

    /// Builds a set from `elements`, collapsing duplicates.
    #[must_use]
    pub fn from_array<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_array_with_hasher(elements, DefaultKeyHasher)
    }

    /// Builds a set from `elements`, collapsing duplicates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableSet;
    ///
    /// let set = ImmutableSet::of(["a", "b", "a"]);
    /// assert_eq!(set.size(), 2);
    /// ```
    #[must_use]
    pub fn of<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_array(elements)
    }
}

impl<T, S> ImmutableSet<T, S> {
    /// Creates an empty set that hashes elements with `hasher`.
    #[inline]
    #[must_use]
    pub const fn with_hasher(hasher: S) -> Self {
        Self {
            inner: ImmutableMap::with_hasher(hasher),
        }
    }

    /// Returns the number of elements in the set.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.inner.size()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `true` if the set contains at least one element.
    #[inline]
    #[must_use]
    pub const fn is_not_empty(&self) -> bool {
        self.inner.is_not_empty()
    }

    /// Height of the underlying trie.
    #[must_use]
    pub fn trie_depth(&self) -> usize {
        self.inner.trie_depth()
    }

    /// Returns an iterator over the elements, in hash order.
    #[must_use]
    pub fn iter(&self) -> ImmutableSetIterator<'_, T> {
        ImmutableSetIterator {
            inner: self.inner.iter(),
        }
    }

    /// Returns `true` if the set contains `element`.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized,
        S: KeyHasher<Q>,
    {
        self.inner.contains(element)
    }

    /// Returns the first element, in hash order, satisfying `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Optional<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.inner
            .find(|element, ()| predicate(element))
            .map(|(element, ())| element)
    }

    /// Returns `true` if any element satisfies `predicate`.
    pub fn exists<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.inner.exists(|element, ()| predicate(element))
    }

    /// Calls `callback` on every element, in hash order.
    pub fn foreach<F>(&self, mut callback: F)
    where
        F: FnMut(&T),
    {
        self.inner.foreach(|element, ()| callback(element));
    }

    /// Folds every element into an accumulator, in hash order.
    pub fn reduce<B, F>(&self, mut function: F, initial: B) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.inner.reduce(
            |accumulator, element, ()| function(accumulator, element),
            initial,
        )
    }

    /// Copies the elements into a vector, in hash order.
    #[must_use]
    pub fn to_array(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Projects the elements into a list, in hash order.
    #[must_use]
    pub fn to_list(&self) -> ImmutableList<T>
    where
        T: Clone,
    {
        conversions::to_list(self)
    }

    /// Builds a map from each element to the key produced by `key_function`.
    #[must_use]
    pub fn to_map<K, F>(&self, key_function: F) -> ImmutableMap<K, T>
    where
        T: Clone,
        K: KeyHash + PartialEq,
        F: FnMut(&T) -> K,
    {
        conversions::to_map_by(self, key_function)
    }

    /// Returns the elements as a lazy sequence.
    #[must_use]
    pub fn to_seq(&self) -> IndexedSequence<T>
    where
        T: Clone + 'static,
    {
        conversions::to_seq(self)
    }

    /// Returns `true` if both sets hold the same elements.
    pub fn equals(&self, other: &Self) -> bool
    where
        S: KeyHasher<T>,
    {
        self.inner.equals(&other.inner)
    }

    /// Returns `true` if every element of `self` is in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableSet;
    ///
    /// let small = ImmutableSet::of([1, 2]);
    /// let large = ImmutableSet::of([1, 2, 3]);
    /// assert!(small.is_subset(&large));
    /// assert!(large.is_superset(&small));
    /// ```
    pub fn is_subset(&self, other: &Self) -> bool
    where
        S: KeyHasher<T>,
    {
        self.size() <= other.size() && self.iter().all(|element| other.contains(element))
    }

    /// Returns `true` if every element of `other` is in `self`.
    pub fn is_superset(&self, other: &Self) -> bool
    where
        S: KeyHasher<T>,
    {
        other.is_subset(self)
    }

    /// Returns `true` if the sets share no element.
    pub fn is_disjoint(&self, other: &Self) -> bool
    where
        S: KeyHasher<T>,
    {
        let (smaller, larger) = if self.size() <= other.size() {
            (self, other)
        } else {
            (other, self)
        };
        !smaller.iter().any(|element| larger.contains(element))
    }
}

impl<T, S> ImmutableSet<T, S>
where
    T: PartialEq,
    S: KeyHasher<T> + Clone,
{
    /// Builds a set from `elements` using `hasher`.
    #[must_use]
    pub fn from_array_with_hasher<I>(elements: I, hasher: S) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            inner: ImmutableMap::from_array_with_hasher(
                elements.into_iter().map(|element| (element, ())),
                hasher,
            ),
        }
    }

    /// Returns a set with `element` added.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableSet;
    ///
    /// let set1 = ImmutableSet::new().add(1);
    /// let set2 = set1.add(2);
    ///
    /// assert_eq!(set1.size(), 1); // Original unchanged
    /// assert_eq!(set2.size(), 2);
    /// ```
    #[must_use]
    pub fn add(&self, element: T) -> Self {
        Self {
            inner: self.inner.add(element, ()),
        }
    }

    /// Returns a set without `element`.
    #[must_use]
    pub fn remove<Q>(&self, element: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: ?Sized,
        S: KeyHasher<Q>,
    {
        Self {
            inner: self.inner.remove(element),
        }
    }

    /// Returns a set holding only the elements satisfying `predicate`.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        Self {
            inner: self.inner.filter(|element, ()| predicate(element)),
        }
    }

    /// Returns the set of transformed elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableSet;
    ///
    /// let set = ImmutableSet::of([1, 2, 3]);
    /// let parity = set.map(|value| value % 2);
    /// assert_eq!(parity.size(), 2);
    /// ```
    #[must_use]
    pub fn map<U, F>(&self, mut mapper: F) -> ImmutableSet<U, S>
    where
        U: PartialEq,
        S: KeyHasher<U>,
        F: FnMut(&T) -> U,
    {
        ImmutableSet {
            inner: self.inner.map(|element, ()| (mapper(element), ())),
        }
    }

    /// Returns the union of two sets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableSet;
    ///
    /// let union = ImmutableSet::of([1, 2]).union(&ImmutableSet::of([2, 3]));
    /// assert_eq!(union.size(), 3);
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        Self {
            inner: self.inner.merge(&other.inner),
        }
    }

    /// Returns the elements present in both sets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableSet;
    ///
    /// let both = ImmutableSet::of([1, 2, 3]).intersection(&ImmutableSet::of([2, 3, 4]));
    /// assert_eq!(both.size(), 2);
    /// assert!(both.contains(&2));
    /// ```
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.filter(|element| other.contains(element))
    }

    /// Returns the elements of `self` absent from `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.filter(|element| !other.contains(element))
    }

    /// Returns the elements present in exactly one of the sets.
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        self.difference(other).union(&other.difference(self))
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the elements of an [`ImmutableSet`], in hash order.
pub struct ImmutableSetIterator<'a, T> {
    inner: ImmutableMapIterator<'a, T, ()>,
}

impl<'a, T> Iterator for ImmutableSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for ImmutableSetIterator<'_, T> {}

impl<T> FusedIterator for ImmutableSetIterator<'_, T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, S: Clone> Clone for ImmutableSet<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, S: Default> Default for ImmutableSet<T, S> {
    #[inline]
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S> FromIterator<T> for ImmutableSet<T, S>
where
    T: PartialEq,
    S: KeyHasher<T> + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_array_with_hasher(iter, S::default())
    }
}

impl<'a, T, S> IntoIterator for &'a ImmutableSet<T, S> {
    type Item = &'a T;
    type IntoIter = ImmutableSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone, S> IntoIterator for ImmutableSet<T, S> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.to_array().into_iter()
    }
}

impl<T, S: KeyHasher<T>> PartialEq for ImmutableSet<T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<T, S: KeyHasher<T>> Eq for ImmutableSet<T, S> {}

impl<T: fmt::Debug, S> fmt::Debug for ImmutableSet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, S> fmt::Display for ImmutableSet<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "}}")
    }
}

/// Hashes the set as a record of its elements, independent of trie layout.
impl<T: KeyHash, S> KeyHash for ImmutableSet<T, S> {
    fn key_hash(&self) -> u32 {
        self.iter()
            .fold(RecordHasher::new("ImmutableSet"), |record, element| {
                let hash = element.key_hash();
                record.field_hash(hash.to_string(), hash)
            })
            .finish()
    }
}

// =============================================================================
// Capability Implementations
// =============================================================================

impl<T: Clone, S> HasToArray for ImmutableSet<T, S> {
    type Item = T;

    fn to_array(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn size(&self) -> usize {
        self.inner.size()
    }
}

impl<T, S> Constructible for ImmutableSet<T, S>
where
    T: PartialEq,
    S: KeyHasher<T> + Clone + Default,
{
    type Item = T;

    fn construct(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize, S> serde::Serialize for ImmutableSet<T, S> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
struct ImmutableSetVisitor<T, S> {
    marker: std::marker::PhantomData<ImmutableSet<T, S>>,
}

#[cfg(feature = "serde")]
impl<T, S> ImmutableSetVisitor<T, S> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, T, S> serde::de::Visitor<'de> for ImmutableSetVisitor<T, S>
where
    T: serde::Deserialize<'de> + PartialEq,
    S: KeyHasher<T> + Clone + Default,
{
    type Value = ImmutableSet<T, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut sequence: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut set = ImmutableSet::default();
        while let Some(element) = sequence.next_element()? {
            set = set.add(element);
        }
        Ok(set)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, S> serde::Deserialize<'de> for ImmutableSet<T, S>
where
    T: serde::Deserialize<'de> + PartialEq,
    S: KeyHasher<T> + Clone + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(ImmutableSetVisitor::new())
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
    fn test_scenario_from_array_with_duplicates() {
        let set = ImmutableSet::from_array([1, 2, 2, 3]);
        assert_eq!(set.size(), 3);
        assert!(set.contains(&2));
        assert!(!set.remove(&2).contains(&2));
        assert!(set.contains(&2));
    }

    #[rstest]
    fn test_empty_set() {
        let set: ImmutableSet<i32> = ImmutableSet::empty();
        assert!(set.is_empty());
        assert!(!set.is_not_empty());
        assert_eq!(set.trie_depth(), 0);
        assert!(set.find(|_| true).is_empty());
        assert_eq!(set.iter().count(), 0);
    }

    #[rstest]
    fn test_string_elements_borrow_as_str() {
        let set = ImmutableSet::of(["apple".to_string(), "banana".to_string()]);
        assert!(set.contains("apple"));
        assert!(!set.contains("cherry"));
        assert_eq!(set.remove("apple").size(), 1);
    }

    #[rstest]
    #[case(&[1, 2, 3], &[3, 4], &[1, 2, 3, 4])]
    #[case(&[], &[1], &[1])]
    #[case(&[5], &[5], &[5])]
    fn test_union(#[case] left: &[i32], #[case] right: &[i32], #[case] expected: &[i32]) {
        let union = ImmutableSet::of(left.to_vec()).union(&ImmutableSet::of(right.to_vec()));
        assert_eq!(union, ImmutableSet::of(expected.to_vec()));
    }

    #[rstest]
    fn test_intersection_and_difference() {
        let left = ImmutableSet::of([1, 2, 3, 4]);
        let right = ImmutableSet::of([3, 4, 5]);

        assert_eq!(left.intersection(&right), ImmutableSet::of([3, 4]));
        assert_eq!(left.difference(&right), ImmutableSet::of([1, 2]));
        let either = ImmutableSet::of([1, 2, 5]);
        assert_eq!(left.symmetric_difference(&right), either);
    }

    #[rstest]
    fn test_subset_superset_disjoint() {
        let small = ImmutableSet::of([1, 2]);
        let large = ImmutableSet::of([1, 2, 3]);
        let other = ImmutableSet::of([7, 8]);

        assert!(small.is_subset(&large));
        assert!(!large.is_subset(&small));
        assert!(large.is_superset(&small));
        assert!(small.is_disjoint(&other));
        assert!(!small.is_disjoint(&large));
        assert!(ImmutableSet::<i32>::new().is_subset(&small));
    }

    #[rstest]
    fn test_find_exists_reduce_foreach() {
        let set = ImmutableSet::of([1, 2, 3, 4]);

        assert_eq!(set.find(|value| *value > 3).to_option(), Some(&4));
        assert!(set.exists(|value| value % 2 == 0));
        assert_eq!(set.reduce(|total, value| total + value, 0), 10);

        let mut seen = 0;
        set.foreach(|_| seen += 1);
        assert_eq!(seen, 4);
    }

    #[rstest]
    fn test_filter_and_map() {
        let set: ImmutableSet<i32> = (1..=10).collect();
        let even = set.filter(|value| value % 2 == 0);
        assert_eq!(even.size(), 5);

        let labels = even.map(|value| format!("n{value}"));
        assert!(labels.contains("n4"));
        assert_eq!(labels.size(), 5);
    }

    #[rstest]
    fn test_conversions() {
        let set = ImmutableSet::of([1, 2, 3]);

        let mut array = set.to_array();
        array.sort_unstable();
        assert_eq!(array, vec![1, 2, 3]);
        assert_eq!(set.to_list().size(), 3);
        assert_eq!(set.to_seq().count(), 3);

        let by_label = set.to_map(|value| format!("#{value}"));
        assert_eq!(by_label.get("#2").to_option(), Some(&2));
    }

    #[rstest]
    fn test_key_hash_ignores_insertion_order() {
        let forward = ImmutableSet::of([1, 2, 3]);
        let backward = ImmutableSet::of([3, 2, 1]);
        assert_eq!(forward.key_hash(), backward.key_hash());
        assert_ne!(forward.key_hash(), ImmutableSet::of([1, 2]).key_hash());
    }

    #[rstest]
    fn test_display_and_debug() {
        let set = ImmutableSet::singleton(7);
        assert_eq!(format!("{set}"), "{7}");
        assert_eq!(format!("{set:?}"), "{7}");
        assert_eq!(format!("{}", ImmutableSet::<i32>::new()), "{}");
    }
}
