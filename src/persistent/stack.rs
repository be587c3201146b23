//! Persistent (immutable) LIFO stack.
//!
//! This module provides [`ImmutableStack`], a singly-linked stack whose
//! versions share their tails.
//!
//! # Overview
//!
//! - O(1) `push`, `pop`, `peek`, `size`
//! - O(N) `contains`, `reverse`, `to_array`
//!
//! Pushing onto a stack allocates one node pointing at the old top:
//!
//! ```text
//! stack1: 2 -> 3 -> nil
//! stack2 = stack1.push(1): 1 -> [2 -> 3 -> nil]  // shares [2, 3] with stack1
//! ```
//!
//! # Examples
//!
//! ```rust
//! use immutable_collections::persistent::ImmutableStack;
//!
//! let stack = ImmutableStack::empty().push(3).push(2).push(1);
//! assert_eq!(stack.peek(), Ok(&1));
//!
//! let popped = stack.pop().unwrap();
//! assert_eq!(popped.peek(), Ok(&2));
//! assert_eq!(stack.size(), 3); // Original unchanged
//! ```

use std::fmt;
use std::iter::{FromIterator, FusedIterator};

use super::{ImmutableList, KeyHash, ReferenceCounter, hash_sequence};
use crate::capability::{Constructible, HasToArray};
use crate::conversions;
use crate::error::{CollectionError, Result};
use crate::optional::Optional;

/// Internal node of the stack.
struct StackNode<T> {
    element: T,
    next: Option<ReferenceCounter<Self>>,
}

/// A persistent (immutable) LIFO stack.
///
/// Enumeration (`iter`, `to_array`) runs from the top down, and
/// [`ImmutableStack::of`] takes its elements in the same top-first order, so
/// `ImmutableStack::of(stack.to_array())` rebuilds `stack`.
///
/// # Time Complexity
///
/// | Operation | Complexity |
/// |-----------|------------|
/// | `push`    | O(1)       |
/// | `pop`     | O(1)       |
/// | `peek`    | O(1)       |
/// | `size`    | O(1)       |
/// | `reverse` | O(N)       |
pub struct ImmutableStack<T> {
    head: Option<ReferenceCounter<StackNode<T>>>,
    length: usize,
}

impl<T> ImmutableStack<T> {
    /// Creates an empty stack.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            head: None,
            length: 0,
        }
    }

    /// Alias of [`ImmutableStack::empty`].
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::empty()
    }

    /// Creates a stack from `elements` listed top first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableStack;
    ///
    /// let stack = ImmutableStack::of([1, 2, 3]);
    /// assert_eq!(stack.peek(), Ok(&1));
    /// assert_eq!(stack.to_array(), vec![1, 2, 3]);
    /// ```
    #[must_use]
    pub fn of<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut elements: Vec<T> = elements.into_iter().collect();
        let mut stack = Self::empty();
        while let Some(element) = elements.pop() {
            stack = stack.push(element);
        }
        stack
    }

    /// Returns a stack with `element` on top.
    #[must_use]
    pub fn push(&self, element: T) -> Self {
        Self {
            head: Some(ReferenceCounter::new(StackNode {
                element,
                next: self.head.clone(),
            })),
            length: self.length + 1,
        }
    }

    /// Returns the top element.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NoSuchElement`] if the stack is empty.
    pub fn peek(&self) -> Result<&T> {
        self.head
            .as_deref()
            .map(|node| &node.element)
            .ok_or(CollectionError::no_such_element("ImmutableStack", "peek"))
    }

    /// Returns the top element, or empty for an empty stack.
    #[must_use]
    pub fn peek_optional(&self) -> Optional<&T> {
        Optional::of_nullable(self.head.as_deref().map(|node| &node.element))
    }

    /// Returns the stack below the top element.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NoSuchElement`] if the stack is empty.
    pub fn pop(&self) -> Result<Self> {
        let node = self
            .head
            .as_deref()
            .ok_or(CollectionError::no_such_element("ImmutableStack", "pop"))?;
        Ok(Self {
            head: node.next.clone(),
            length: self.length - 1,
        })
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.length
    }

    /// Returns `true` if the stack has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `true` if the stack has at least one element.
    #[inline]
    #[must_use]
    pub const fn is_not_empty(&self) -> bool {
        self.length != 0
    }

    /// Returns an iterator from the top down.
    #[must_use]
    pub fn iter(&self) -> ImmutableStackIterator<'_, T> {
        ImmutableStackIterator {
            current: self.head.as_deref(),
            remaining: self.length,
        }
    }

    /// Returns `true` if the stack holds an element equal to `element`.
    pub fn contains(&self, element: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|candidate| candidate == element)
    }

    /// Returns the topmost element satisfying `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Optional<&T>
    where
        P: FnMut(&T) -> bool,
    {
        Optional::of_nullable(self.iter().find(|element| predicate(element)))
    }

    /// Returns `true` if any element satisfies `predicate`.
    pub fn exists<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().any(predicate)
    }

    /// Calls `callback` on every element from the top down.
    pub fn foreach<F>(&self, callback: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(callback);
    }

    /// Folds the elements from the top down.
    pub fn reduce<B, F>(&self, function: F, initial: B) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.iter().fold(initial, function)
    }

    /// Returns a stack of transformed elements in the same order.
    #[must_use]
    pub fn map<U, F>(&self, function: F) -> ImmutableStack<U>
    where
        F: FnMut(&T) -> U,
    {
        ImmutableStack::of(self.iter().map(function))
    }

    /// Compares two stacks element-wise from the top down.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Clone> ImmutableStack<T> {
    /// Returns the stack with its elements in reverse order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableStack;
    ///
    /// let stack = ImmutableStack::of([1, 2, 3]);
    /// assert_eq!(stack.reverse().to_array(), vec![3, 2, 1]);
    /// ```
    #[must_use]
    pub fn reverse(&self) -> Self {
        self.iter()
            .fold(Self::empty(), |stack, element| stack.push(element.clone()))
    }

    /// Returns the elements satisfying `predicate`, in the same order.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        Self::of(self.iter().filter(|element| predicate(element)).cloned())
    }

    /// Copies the elements into a vector, top first.
    #[must_use]
    pub fn to_array(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Projects the elements into a list, top first.
    #[must_use]
    pub fn to_list(&self) -> ImmutableList<T> {
        conversions::to_list(self)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the elements of an [`ImmutableStack`], top first.
pub struct ImmutableStackIterator<'a, T> {
    current: Option<&'a StackNode<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for ImmutableStackIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = node.next.as_deref();
        self.remaining -= 1;
        Some(&node.element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for ImmutableStackIterator<'_, T> {}

impl<T> FusedIterator for ImmutableStackIterator<'_, T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for ImmutableStack<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            length: self.length,
        }
    }
}

/// Unlinks uniquely owned nodes one at a time so that dropping a long
/// stack does not recurse once per node.
impl<T> Drop for ImmutableStack<T> {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(node) = next {
            match ReferenceCounter::try_unwrap(node) {
                Ok(mut node) => next = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

impl<T> Default for ImmutableStack<T> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

/// Collects elements listed top first, like [`ImmutableStack::of`].
impl<T> FromIterator<T> for ImmutableStack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl<'a, T> IntoIterator for &'a ImmutableStack<T> {
    type Item = &'a T;
    type IntoIter = ImmutableStackIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone> IntoIterator for ImmutableStack<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.to_array().into_iter()
    }
}

impl<T: PartialEq> PartialEq for ImmutableStack<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<T: Eq> Eq for ImmutableStack<T> {}

impl<T: fmt::Debug> fmt::Debug for ImmutableStack<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: KeyHash> KeyHash for ImmutableStack<T> {
    fn key_hash(&self) -> u32 {
        hash_sequence(self.iter().map(KeyHash::key_hash))
    }
}

// =============================================================================
// Capability Implementations
// =============================================================================

impl<T: Clone> HasToArray for ImmutableStack<T> {
    type Item = T;

    fn to_array(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn size(&self) -> usize {
        self.length
    }
}

impl<T> Constructible for ImmutableStack<T> {
    type Item = T;

    fn construct(items: Vec<T>) -> Self {
        Self::of(items)
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for ImmutableStack<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for ImmutableStack<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <Vec<T> as serde::Deserialize>::deserialize(deserializer).map(Self::of)
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
    fn test_empty_peek_and_pop_fail() {
        let stack: ImmutableStack<i32> = ImmutableStack::empty();
        assert_eq!(
            stack.peek(),
            Err(CollectionError::NoSuchElement {
                collection: "ImmutableStack",
                operation: "peek",
            })
        );
        assert!(stack.pop().is_err());
        assert!(stack.peek_optional().is_empty());
    }

    #[rstest]
    fn test_push_shares_tail() {
        let base = ImmutableStack::of([2, 3]);
        let pushed = base.push(1);

        assert_eq!(pushed.to_array(), vec![1, 2, 3]);
        assert_eq!(base.to_array(), vec![2, 3]);

        let tail = pushed.pop().unwrap();
        let (Some(left), Some(right)) = (&tail.head, &base.head) else {
            panic!("both stacks are populated");
        };
        assert!(ReferenceCounter::ptr_eq(left, right));
    }

    #[rstest]
    fn test_of_round_trips_through_to_array() {
        let stack = ImmutableStack::of(["a", "b", "c"]);
        assert_eq!(ImmutableStack::of(stack.to_array()), stack);
        assert_eq!(stack.to_list().to_array(), vec!["a", "b", "c"]);
    }

    #[rstest]
    fn test_queries_and_transforms() {
        let stack = ImmutableStack::of([1, 2, 3, 4]);

        assert!(stack.contains(&3));
        assert_eq!(stack.find(|value| value % 2 == 0).to_option(), Some(&2));
        assert!(stack.exists(|value| *value == 4));
        assert_eq!(stack.reduce(|total, value| total * value, 1), 24);
        assert_eq!(stack.map(|value| value * 2).to_array(), vec![2, 4, 6, 8]);
        assert_eq!(stack.filter(|value| *value > 2).to_array(), vec![3, 4]);
        assert_eq!(stack.reverse().peek(), Ok(&4));

        let mut seen = Vec::new();
        stack.foreach(|value| seen.push(*value));
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[rstest]
    fn test_deep_stack_drops_without_overflow() {
        let stack: ImmutableStack<u32> = (0..200_000).collect();
        assert_eq!(stack.size(), 200_000);
        drop(stack);
    }

    #[rstest]
    fn test_key_hash_matches_sequence() {
        assert_eq!(ImmutableStack::of([1, 2]).key_hash(), [1, 2].key_hash());
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_round_trip_keeps_top_first_order() {
        let stack = ImmutableStack::of([1, 2, 3]);
        let json = serde_json::to_string(&stack).unwrap();
        assert_eq!(json, "[1,2,3]");
        let restored: ImmutableStack<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, stack);
    }
}
