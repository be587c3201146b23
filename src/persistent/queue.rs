//! Persistent (immutable) FIFO queue.
//!
//! [`ImmutableQueue`] keeps two [`ImmutableStack`]s: `front` holds the
//! oldest elements with the next one to leave on top, and `back` holds the
//! newest elements with the most recent on top. When `front` runs out,
//! `back` is reversed into it. `front` is never empty while the queue has
//! elements, so `peek` is O(1).
//!
//! # Examples
//!
//! ```rust
//! use immutable_collections::persistent::ImmutableQueue;
//!
//! let queue = ImmutableQueue::empty().enqueue(1).enqueue(2).enqueue(3);
//! assert_eq!(queue.peek(), Ok(&1));
//!
//! let rest = queue.dequeue().unwrap();
//! assert_eq!(rest.to_array(), vec![2, 3]);
//! assert_eq!(queue.size(), 3); // Original unchanged
//! ```

use std::fmt;
use std::iter::{FromIterator, FusedIterator};

use super::stack::ImmutableStackIterator;
use super::{ImmutableList, ImmutableStack, KeyHash, hash_sequence};
use crate::capability::{Constructible, HasToArray};
use crate::conversions;
use crate::error::{CollectionError, Result};
use crate::optional::Optional;

/// A persistent (immutable) FIFO queue.
///
/// # Time Complexity
///
/// | Operation | Complexity     |
/// |-----------|----------------|
/// | `enqueue` | O(1)           |
/// | `dequeue` | O(1) amortized |
/// | `peek`    | O(1)           |
/// | `size`    | O(1)           |
pub struct ImmutableQueue<T> {
    front: ImmutableStack<T>,
    back: ImmutableStack<T>,
}

impl<T> ImmutableQueue<T> {
    /// Creates an empty queue.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            front: ImmutableStack::empty(),
            back: ImmutableStack::empty(),
        }
    }

    /// Alias of [`ImmutableQueue::empty`].
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::empty()
    }

    /// Creates a queue from `elements`, the first one at the front.
    #[must_use]
    pub fn of<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            front: ImmutableStack::of(elements),
            back: ImmutableStack::empty(),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.front.size() + self.back.size()
    }

    /// Returns `true` if the queue has no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.front.is_empty()
    }

    /// Returns `true` if the queue has at least one element.
    #[inline]
    #[must_use]
    pub const fn is_not_empty(&self) -> bool {
        self.front.is_not_empty()
    }

    /// Returns the front element.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NoSuchElement`] if the queue is empty.
    pub fn peek(&self) -> Result<&T> {
        self.front
            .peek()
            .map_err(|_| CollectionError::no_such_element("ImmutableQueue", "peek"))
    }

    /// Returns the front element, or empty for an empty queue.
    #[must_use]
    pub fn peek_optional(&self) -> Optional<&T> {
        self.front.peek_optional()
    }

    /// Returns an iterator from the front to the back.
    #[must_use]
    pub fn iter(&self) -> ImmutableQueueIterator<'_, T> {
        let mut back: Vec<&T> = self.back.iter().collect();
        back.reverse();
        ImmutableQueueIterator {
            front: self.front.iter(),
            back: back.into_iter(),
        }
    }

    /// Returns `true` if the queue holds an element equal to `element`.
    pub fn contains(&self, element: &T) -> bool
    where
        T: PartialEq,
    {
        self.front.contains(element) || self.back.contains(element)
    }

    /// Returns the element nearest the front satisfying `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Optional<&T>
    where
        P: FnMut(&T) -> bool,
    {
        Optional::of_nullable(self.iter().find(|element| predicate(element)))
    }

    /// Returns `true` if any element satisfies `predicate`.
    pub fn exists<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.front.exists(&mut predicate) || self.back.exists(&mut predicate)
    }

    /// Calls `callback` on every element from the front.
    pub fn foreach<F>(&self, callback: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(callback);
    }

    /// Folds the elements from the front.
    pub fn reduce<B, F>(&self, function: F, initial: B) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.iter().fold(initial, function)
    }

    /// Returns a queue of transformed elements in the same order.
    #[must_use]
    pub fn map<U, F>(&self, function: F) -> ImmutableQueue<U>
    where
        F: FnMut(&T) -> U,
    {
        ImmutableQueue::of(self.iter().map(function))
    }

    /// Compares two queues element-wise from the front.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        self.size() == other.size() && self.iter().eq(other.iter())
    }
}

impl<T: Clone> ImmutableQueue<T> {
    /// Returns a queue with `element` at the back.
    #[must_use]
    pub fn enqueue(&self, element: T) -> Self {
        if self.front.is_empty() {
            Self {
                front: self.front.push(element),
                back: ImmutableStack::empty(),
            }
        } else {
            Self {
                front: self.front.clone(),
                back: self.back.push(element),
            }
        }
    }

    /// Returns the queue without its front element.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NoSuchElement`] if the queue is empty.
    pub fn dequeue(&self) -> Result<Self> {
        let front = self
            .front
            .pop()
            .map_err(|_| CollectionError::no_such_element("ImmutableQueue", "dequeue"))?;
        if front.is_empty() {
            Ok(Self {
                front: self.back.reverse(),
                back: ImmutableStack::empty(),
            })
        } else {
            Ok(Self {
                front,
                back: self.back.clone(),
            })
        }
    }

    /// Returns the elements satisfying `predicate`, in the same order.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        Self::of(self.iter().filter(|element| predicate(element)).cloned())
    }

    /// Copies the elements into a vector, front first.
    #[must_use]
    pub fn to_array(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Projects the elements into a list, front first.
    #[must_use]
    pub fn to_list(&self) -> ImmutableList<T> {
        conversions::to_list(self)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the elements of an [`ImmutableQueue`], front first.
pub struct ImmutableQueueIterator<'a, T> {
    front: ImmutableStackIterator<'a, T>,
    back: std::vec::IntoIter<&'a T>,
}

impl<'a, T> Iterator for ImmutableQueueIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.front.next().or_else(|| self.back.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.front.len() + self.back.len();
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for ImmutableQueueIterator<'_, T> {}

impl<T> FusedIterator for ImmutableQueueIterator<'_, T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for ImmutableQueue<T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
        }
    }
}

impl<T> Default for ImmutableQueue<T> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> FromIterator<T> for ImmutableQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl<'a, T> IntoIterator for &'a ImmutableQueue<T> {
    type Item = &'a T;
    type IntoIter = ImmutableQueueIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone> IntoIterator for ImmutableQueue<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.to_array().into_iter()
    }
}

impl<T: PartialEq> PartialEq for ImmutableQueue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<T: Eq> Eq for ImmutableQueue<T> {}

impl<T: fmt::Debug> fmt::Debug for ImmutableQueue<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: KeyHash> KeyHash for ImmutableQueue<T> {
    fn key_hash(&self) -> u32 {
        hash_sequence(self.iter().map(KeyHash::key_hash))
    }
}

// =============================================================================
// Capability Implementations
// =============================================================================

impl<T: Clone> HasToArray for ImmutableQueue<T> {
    type Item = T;

    fn to_array(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn size(&self) -> usize {
        self.front.size() + self.back.size()
    }
}

impl<T> Constructible for ImmutableQueue<T> {
    type Item = T;

    fn construct(items: Vec<T>) -> Self {
        Self::of(items)
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for ImmutableQueue<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for ImmutableQueue<T> {
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
