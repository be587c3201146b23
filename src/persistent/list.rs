//! Persistent (immutable) array-backed list.
//!
//! This module provides [`ImmutableList`], an immutable list stored as one
//! shared slice.
//!
//! # Overview
//!
//! Reads are as cheap as on a `Vec`; every update copies the slice into a
//! new allocation and leaves the original untouched. Clones share the
//! slice.
//!
//! - O(1) `get`, `first`, `last`, `size`
//! - O(N) `add`, `prepend`, `set`, `insert_at`, `remove_at`
//!
//! # Examples
//!
//! ```rust
//! use immutable_collections::persistent::ImmutableList;
//!
//! let list = ImmutableList::of([1, 2, 3]);
//! let extended = list.add(4);
//!
//! assert_eq!(list.size(), 3);     // Original unchanged
//! assert_eq!(extended.size(), 4); // New version
//! assert_eq!(extended.last().to_option(), Some(&4));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::{FromIterator, FusedIterator};
use std::slice;

use super::{
    ImmutableMap, ImmutableSet, IndexedSequence, KeyHash, ReferenceCounter, hash_sequence,
};
use crate::capability::{Constructible, HasToArray};
use crate::conversions;
use crate::error::{CollectionError, Result};
use crate::optional::Optional;

/// A persistent (immutable) list backed by a shared slice.
///
/// # Time Complexity
///
/// | Operation   | Complexity |
/// |-------------|------------|
/// | `get`       | O(1)       |
/// | `size`      | O(1)       |
/// | `add`       | O(N)       |
/// | `prepend`   | O(N)       |
/// | `insert_at` | O(N)       |
/// | `remove_at` | O(N)       |
/// | `contains`  | O(N)       |
///
/// # Examples
///
/// ```rust
/// use immutable_collections::persistent::ImmutableList;
///
/// let list = ImmutableList::of(["a", "b"]);
/// assert_eq!(list.get(1).to_option(), Some(&"b"));
/// assert!(list.get(2).is_empty());
/// ```
pub struct ImmutableList<T> {
    elements: ReferenceCounter<[T]>,
}

impl<T> ImmutableList<T> {
    /// Creates a new empty list.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Alias of [`ImmutableList::new`].
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::new()
    }

    /// Creates a list that takes ownership of `elements`.
    #[inline]
    #[must_use]
    pub fn from_vec(elements: Vec<T>) -> Self {
        Self {
            elements: ReferenceCounter::from(elements),
        }
    }

    /// Creates a list from `elements`, in order.
    #[must_use]
    pub fn of<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_vec(elements.into_iter().collect())
    }

    /// Alias of [`ImmutableList::of`].
    #[must_use]
    pub fn from_array<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::of(elements)
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the list has no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns `true` if the list has at least one element.
    #[inline]
    #[must_use]
    pub fn is_not_empty(&self) -> bool {
        !self.elements.is_empty()
    }

    /// Borrows the elements as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// Returns an iterator over the elements, in order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Returns the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Optional<&T> {
        Optional::of_nullable(self.elements.get(index))
    }

    /// Returns the first element.
    #[must_use]
    pub fn first(&self) -> Optional<&T> {
        Optional::of_nullable(self.elements.first())
    }

    /// Returns the last element.
    #[must_use]
    pub fn last(&self) -> Optional<&T> {
        Optional::of_nullable(self.elements.last())
    }

    /// Returns the first element.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NoSuchElement`] if the list is empty.
    pub fn first_or_error(&self) -> Result<&T> {
        self.elements
            .first()
            .ok_or(CollectionError::no_such_element("ImmutableList", "first"))
    }

    /// Returns the last element.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NoSuchElement`] if the list is empty.
    pub fn last_or_error(&self) -> Result<&T> {
        self.elements
            .last()
            .ok_or(CollectionError::no_such_element("ImmutableList", "last"))
    }

    /// Returns the position of the first element satisfying `predicate`.
    pub fn find_index<P>(&self, predicate: P) -> Optional<usize>
    where
        P: FnMut(&T) -> bool,
    {
        Optional::of_nullable(self.elements.iter().position(predicate))
    }

    /// Returns the first element satisfying `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Optional<&T>
    where
        P: FnMut(&T) -> bool,
    {
        Optional::of_nullable(self.elements.iter().find(|element| predicate(element)))
    }

    /// Returns `true` if any element satisfies `predicate`.
    pub fn exists<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.elements.iter().any(predicate)
    }

    /// Calls `callback` on every element, in order.
    pub fn foreach<F>(&self, callback: F)
    where
        F: FnMut(&T),
    {
        self.elements.iter().for_each(callback);
    }

    /// Folds the elements from first to last.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableList;
    ///
    /// let list = ImmutableList::of(["a", "b", "c"]);
    /// let joined = list.reduce(|text, element| text + *element, String::new());
    /// assert_eq!(joined, "abc");
    /// ```
    pub fn reduce<B, F>(&self, function: F, initial: B) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.elements.iter().fold(initial, function)
    }

    /// Returns a list of transformed elements.
    #[must_use]
    pub fn map<U, F>(&self, function: F) -> ImmutableList<U>
    where
        F: FnMut(&T) -> U,
    {
        self.elements.iter().map(function).collect()
    }

    /// Returns `true` if the list holds an element equal to `element`.
    pub fn contains(&self, element: &T) -> bool
    where
        T: PartialEq,
    {
        self.elements.contains(element)
    }

    /// Returns the position of the first element equal to `element`.
    pub fn index_of(&self, element: &T) -> Optional<usize>
    where
        T: PartialEq,
    {
        self.find_index(|candidate| candidate == element)
    }

    /// Compares two lists element-wise with `comparator`.
    pub fn equals_with<F>(&self, other: &Self, mut comparator: F) -> bool
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.size() == other.size()
            && self
                .iter()
                .zip(other.iter())
                .all(|(left, right)| comparator(left, right))
    }

    /// Compares two lists element-wise with `==`.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        ReferenceCounter::ptr_eq(&self.elements, &other.elements)
            || self.elements[..] == other.elements[..]
    }
}

impl<T: Clone> ImmutableList<T> {
    fn rebuilt<F>(&self, extra: usize, build: F) -> Self
    where
        F: FnOnce(&mut Vec<T>),
    {
        let mut elements = Vec::with_capacity(self.size() + extra);
        build(&mut elements);
        Self::from_vec(elements)
    }

    /// Returns a list with `element` appended.
    #[must_use]
    pub fn add(&self, element: T) -> Self {
        self.rebuilt(1, |elements| {
            elements.extend_from_slice(&self.elements);
            elements.push(element);
        })
    }

    /// Returns a list with `element` in front.
    #[must_use]
    pub fn prepend(&self, element: T) -> Self {
        self.rebuilt(1, |elements| {
            elements.push(element);
            elements.extend_from_slice(&self.elements);
        })
    }

    /// Returns a list with `element` inserted before `index`.
    ///
    /// `index == size()` appends.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfBounds`] if `index > size()`.
    pub fn insert_at(&self, index: usize, element: T) -> Result<Self> {
        if index > self.size() {
            return Err(CollectionError::index_out_of_bounds(index, self.size()));
        }
        Ok(self.rebuilt(1, |elements| {
            elements.extend_from_slice(&self.elements[..index]);
            elements.push(element);
            elements.extend_from_slice(&self.elements[index..]);
        }))
    }

    /// Returns a list with the element at `index` replaced.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfBounds`] if `index >= size()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableList;
    ///
    /// let list = ImmutableList::of([1, 2, 3]);
    /// assert_eq!(list.set(1, 20).map(|list| list.to_array()), Ok(vec![1, 20, 3]));
    /// assert!(list.set(3, 0).is_err());
    /// ```
    pub fn set(&self, index: usize, element: T) -> Result<Self> {
        if index >= self.size() {
            return Err(CollectionError::index_out_of_bounds(index, self.size()));
        }
        let mut elements = self.elements.to_vec();
        elements[index] = element;
        Ok(Self::from_vec(elements))
    }

    /// Returns a list without the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfBounds`] if `index >= size()`.
    pub fn remove_at(&self, index: usize) -> Result<Self> {
        if index >= self.size() {
            return Err(CollectionError::index_out_of_bounds(index, self.size()));
        }
        Ok(self.rebuilt(0, |elements| {
            elements.extend_from_slice(&self.elements[..index]);
            elements.extend_from_slice(&self.elements[index + 1..]);
        }))
    }

    /// Returns the elements of `self` followed by those of `other`.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        self.rebuilt(other.size(), |elements| {
            elements.extend_from_slice(&self.elements);
            elements.extend_from_slice(&other.elements);
        })
    }

    /// Returns the elements satisfying `predicate`, in order.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        self.elements
            .iter()
            .filter(|element| predicate(element))
            .cloned()
            .collect()
    }

    /// Returns the elements in reverse order.
    #[must_use]
    pub fn reverse(&self) -> Self {
        self.elements.iter().rev().cloned().collect()
    }

    /// Returns the elements in `start..end`, with both bounds clamped to the list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableList;
    ///
    /// let list = ImmutableList::of([1, 2, 3, 4]);
    /// assert_eq!(list.slice(1, 3).to_array(), vec![2, 3]);
    /// assert_eq!(list.slice(2, 99).to_array(), vec![3, 4]);
    /// assert!(list.slice(3, 1).is_empty());
    /// ```
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.size());
        let start = start.min(end);
        Self::from_vec(self.elements[start..end].to_vec())
    }

    /// Returns the elements sorted by `comparator`; the sort is stable.
    #[must_use]
    pub fn sort_by<F>(&self, comparator: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut elements = self.elements.to_vec();
        elements.sort_by(comparator);
        Self::from_vec(elements)
    }

    /// Copies the elements into a vector.
    #[must_use]
    pub fn to_array(&self) -> Vec<T> {
        self.elements.to_vec()
    }

    /// Projects the elements into a set.
    #[must_use]
    pub fn to_set(&self) -> ImmutableSet<T>
    where
        T: KeyHash + PartialEq,
    {
        conversions::to_set(self)
    }

    /// Builds a map keyed by `key_function`; later elements win.
    #[must_use]
    pub fn to_map<K, F>(&self, key_function: F) -> ImmutableMap<K, T>
    where
        K: KeyHash + PartialEq,
        F: FnMut(&T) -> K,
    {
        conversions::to_map_by(self, key_function)
    }

    /// Returns the elements as a lazy sequence.
    #[must_use]
    pub fn to_seq(&self) -> IndexedSequence<T>
    where
        T: 'static,
    {
        conversions::to_seq(self)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An owning iterator over the elements of an [`ImmutableList`].
///
/// The slice stays shared; each element is cloned as it is yielded.
pub struct ImmutableListIntoIterator<T> {
    elements: ReferenceCounter<[T]>,
    front: usize,
    back: usize,
}

impl<T: Clone> Iterator for ImmutableListIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let element = self.elements[self.front].clone();
        self.front += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> DoubleEndedIterator for ImmutableListIntoIterator<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.elements[self.back].clone())
    }
}

impl<T: Clone> ExactSizeIterator for ImmutableListIntoIterator<T> {}

impl<T: Clone> FusedIterator for ImmutableListIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for ImmutableList<T> {
    fn clone(&self) -> Self {
        Self {
            elements: ReferenceCounter::clone(&self.elements),
        }
    }
}

impl<T> Default for ImmutableList<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for ImmutableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl<T: Clone> IntoIterator for ImmutableList<T> {
    type Item = T;
    type IntoIter = ImmutableListIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        let back = self.size();
        ImmutableListIntoIterator {
            elements: self.elements,
            front: 0,
            back,
        }
    }
}

impl<'a, T> IntoIterator for &'a ImmutableList<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for ImmutableList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<T: Eq> Eq for ImmutableList<T> {}

impl<T: fmt::Debug> fmt::Debug for ImmutableList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for ImmutableList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        for (index, element) in self.iter().enumerate() {
            if index > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

impl<T: KeyHash> KeyHash for ImmutableList<T> {
    fn key_hash(&self) -> u32 {
        hash_sequence(self.iter().map(KeyHash::key_hash))
    }
}

// =============================================================================
// Capability Implementations
// =============================================================================

impl<T: Clone> HasToArray for ImmutableList<T> {
    type Item = T;

    fn to_array(&self) -> Vec<T> {
        self.elements.to_vec()
    }

    fn size(&self) -> usize {
        self.elements.len()
    }
}

impl<T> Constructible for ImmutableList<T> {
    type Item = T;

    fn construct(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for ImmutableList<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for ImmutableList<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <Vec<T> as serde::Deserialize>::deserialize(deserializer).map(Self::from_vec)
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
    fn test_empty() {
        let list: ImmutableList<i32> = ImmutableList::empty();
        assert!(list.is_empty());
        assert!(list.first().is_empty());
        assert_eq!(
            list.first_or_error(),
            Err(CollectionError::no_such_element("ImmutableList", "first"))
        );
        assert!(list.last_or_error().is_err());
    }

    #[rstest]
    fn test_add_prepend_keep_original() {
        let list = ImmutableList::of([2, 3]);
        let appended = list.add(4);
        let prepended = list.prepend(1);

        assert_eq!(list.to_array(), vec![2, 3]);
        assert_eq!(appended.to_array(), vec![2, 3, 4]);
        assert_eq!(prepended.to_array(), vec![1, 2, 3]);
    }

    #[rstest]
    #[case(0, vec![9, 1, 2])]
    #[case(1, vec![1, 9, 2])]
    #[case(2, vec![1, 2, 9])]
    fn test_insert_at(#[case] index: usize, #[case] expected: Vec<i32>) {
        let list = ImmutableList::of([1, 2]);
        let inserted = list.insert_at(index, 9).map(|list| list.to_array());
        assert_eq!(inserted, Ok(expected));
    }

    #[rstest]
    fn test_indexed_mutators_reject_out_of_bounds() {
        let list = ImmutableList::of([1, 2]);
        assert_eq!(
            list.insert_at(3, 0).map(|list| list.size()),
            Err(CollectionError::IndexOutOfBounds {
                index: 3,
                length: 2,
            })
        );
        assert!(list.set(2, 0).is_err());
        assert!(list.remove_at(2).is_err());
        assert_eq!(list.remove_at(0).map(|list| list.to_array()), Ok(vec![2]));
    }

    #[rstest]
    fn test_queries() {
        let list = ImmutableList::of(["a", "b", "c", "b"]);

        assert!(list.contains(&"c"));
        assert_eq!(list.index_of(&"b").to_option(), Some(1));
        assert!(list.index_of(&"z").is_empty());
        assert_eq!(list.find(|element| *element > "a").to_option(), Some(&"b"));
        assert!(list.exists(|element| *element == "c"));
        assert_eq!(list.get(3).to_option(), Some(&"b"));
    }

    #[rstest]
    fn test_transforms() {
        let list = ImmutableList::of([3, 1, 2]);

        assert_eq!(list.map(|value| value * 10).to_array(), vec![30, 10, 20]);
        assert_eq!(list.filter(|value| *value > 1).to_array(), vec![3, 2]);
        assert_eq!(list.reverse().to_array(), vec![2, 1, 3]);
        assert_eq!(list.sort_by(Ord::cmp).to_array(), vec![1, 2, 3]);
        let tail = ImmutableList::of([4]);
        assert_eq!(list.concat(&tail).to_array(), vec![3, 1, 2, 4]);
        assert_eq!(list.reduce(|total, value| total + value, 0), 6);
    }

    #[rstest]
    fn test_conversions() {
        let list = ImmutableList::of([1, 2, 2]);

        assert_eq!(list.to_set().size(), 2);
        assert_eq!(list.to_seq().count(), 3);
        let by_square = list.to_map(|value| value * value);
        assert_eq!(by_square.get(&4).to_option(), Some(&2));
    }

    #[rstest]
    fn test_owned_iterator_is_double_ended() {
        let list = ImmutableList::of([1, 2, 3]);
        let mut iterator = list.clone().into_iter();
        assert_eq!(iterator.len(), 3);
        assert_eq!(iterator.next_back(), Some(3));
        assert_eq!(iterator.collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(list.size(), 3);
    }

    #[rstest]
    fn test_key_hash_is_order_sensitive() {
        assert_eq!(ImmutableList::of([1, 2]).key_hash(), vec![1, 2].key_hash());
        assert_ne!(
            ImmutableList::of([1, 2]).key_hash(),
            ImmutableList::of([2, 1]).key_hash()
        );
    }

    #[rstest]
    fn test_display_and_equality() {
        let list = ImmutableList::of([1, 2]);
        assert_eq!(format!("{list}"), "[1, 2]");
        assert_eq!(format!("{list:?}"), "[1, 2]");
        assert_eq!(list, ImmutableList::of([1, 2]));
        let tens = ImmutableList::of([10, 20]);
        assert!(list.equals_with(&tens, |left, right| left * 10 == *right));
    }
}
