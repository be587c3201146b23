//! Lazy, re-iterable sequence.
//!
//! [`IndexedSequence`] records a chain of operations (`map`, `filter`,
//! `take`, `skip`) over a shared snapshot of elements. Defining an
//! operation is O(1); nothing runs until the sequence is evaluated by
//! `iter`, `get`, `count`, `to_array` and friends. Every evaluation
//! starts again from the snapshot, so a sequence can be consumed any
//! number of times.
//!
//! Closures are shared through [`Rc`], so a sequence is neither `Send` nor
//! `Sync`, even with the `arc` feature enabled.
//!
//! # Examples
//!
//! ```rust
//! use immutable_collections::persistent::IndexedSequence;
//!
//! let sequence = IndexedSequence::of(1..=10)
//!     .filter(|value| value % 2 == 0)
//!     .map(|value| value * value)
//!     .skip(1)
//!     .take(2);
//!
//! assert_eq!(sequence.to_array(), vec![16, 36]);
//! assert_eq!(sequence.count(), 2); // Evaluated again from the start
//! ```

use std::fmt;
use std::rc::Rc;

use super::{ImmutableList, ImmutableSet, KeyHash};
use crate::capability::{Constructible, HasToArray};
use crate::optional::Optional;

// =============================================================================
// Operation Chain
// =============================================================================

/// A step of the chain that can start a fresh pass over its output.
trait SequenceOperation<T> {
    fn create_iterator(&self) -> Box<dyn Iterator<Item = T> + '_>;
}

/// The snapshot every pass starts from.
struct SourceOperation<T> {
    elements: Rc<[T]>,
}

impl<T: Clone> SequenceOperation<T> for SourceOperation<T> {
    fn create_iterator(&self) -> Box<dyn Iterator<Item = T> + '_> {
        Box::new(self.elements.iter().cloned())
    }
}

struct FilterOperation<T> {
    source: Rc<dyn SequenceOperation<T>>,
    predicate: Rc<dyn Fn(&T) -> bool>,
}

impl<T: 'static> SequenceOperation<T> for FilterOperation<T> {
    fn create_iterator(&self) -> Box<dyn Iterator<Item = T> + '_> {
        let predicate = Rc::clone(&self.predicate);
        Box::new(
            self.source
                .create_iterator()
                .filter(move |element| predicate(element)),
        )
    }
}

struct MapOperation<T, U> {
    source: Rc<dyn SequenceOperation<T>>,
    function: Rc<dyn Fn(T) -> U>,
}

impl<T: 'static, U: 'static> SequenceOperation<U> for MapOperation<T, U> {
    fn create_iterator(&self) -> Box<dyn Iterator<Item = U> + '_> {
        let function = Rc::clone(&self.function);
        Box::new(
            self.source
                .create_iterator()
                .map(move |element| function(element)),
        )
    }
}

struct TakeOperation<T> {
    source: Rc<dyn SequenceOperation<T>>,
    count: usize,
}

impl<T: 'static> SequenceOperation<T> for TakeOperation<T> {
    fn create_iterator(&self) -> Box<dyn Iterator<Item = T> + '_> {
        Box::new(self.source.create_iterator().take(self.count))
    }
}

struct SkipOperation<T> {
    source: Rc<dyn SequenceOperation<T>>,
    count: usize,
}

impl<T: 'static> SequenceOperation<T> for SkipOperation<T> {
    fn create_iterator(&self) -> Box<dyn Iterator<Item = T> + '_> {
        Box::new(self.source.create_iterator().skip(self.count))
    }
}

// =============================================================================
// IndexedSequence Definition
// =============================================================================

/// A lazy sequence evaluated afresh on every pass.
///
/// # Complexity
///
/// | Operation                  | Definition | Evaluation |
/// |----------------------------|------------|------------|
/// | `map`, `filter`            | O(1)       | O(N)       |
/// | `take`, `skip`             | O(1)       | O(N)       |
/// | `get(index)`               | -          | O(index)   |
/// | `count`, `to_array`        | -          | O(N)       |
pub struct IndexedSequence<T> {
    operation: Rc<dyn SequenceOperation<T>>,
}

impl<T: Clone + 'static> IndexedSequence<T> {
    /// Creates a sequence over `elements`.
    #[must_use]
    pub fn from_vec(elements: Vec<T>) -> Self {
        Self {
            operation: Rc::new(SourceOperation {
                elements: Rc::from(elements),
            }),
        }
    }

    /// Creates a sequence over a snapshot of `elements`.
    #[must_use]
    pub fn of<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_vec(elements.into_iter().collect())
    }

    /// Creates an empty sequence.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_vec(Vec::new())
    }
}

impl<T: 'static> IndexedSequence<T> {
    /// Returns a fresh iterator over the sequence.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.operation.create_iterator()
    }

    /// Returns a sequence of the elements satisfying `predicate`.
    #[must_use]
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        Self {
            operation: Rc::new(FilterOperation {
                source: self.operation,
                predicate: Rc::new(predicate),
            }),
        }
    }

    /// Returns a sequence of transformed elements.
    #[must_use]
    pub fn map<U, F>(self, function: F) -> IndexedSequence<U>
    where
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        IndexedSequence {
            operation: Rc::new(MapOperation {
                source: self.operation,
                function: Rc::new(function),
            }),
        }
    }

    /// Returns a sequence of at most the first `count` elements.
    #[must_use]
    pub fn take(self, count: usize) -> Self {
        Self {
            operation: Rc::new(TakeOperation {
                source: self.operation,
                count,
            }),
        }
    }

    /// Returns a sequence without the first `count` elements.
    #[must_use]
    pub fn skip(self, count: usize) -> Self {
        Self {
            operation: Rc::new(SkipOperation {
                source: self.operation,
                count,
            }),
        }
    }

    /// Returns the element at `index`, evaluating up to it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::IndexedSequence;
    ///
    /// let squares = IndexedSequence::of(0..100).map(|value| value * value);
    /// assert_eq!(squares.get(7).to_option(), Some(49));
    /// assert!(squares.get(100).is_empty());
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Optional<T> {
        Optional::of_nullable(self.iter().nth(index))
    }

    /// Returns the first element.
    #[must_use]
    pub fn first(&self) -> Optional<T> {
        Optional::of_nullable(self.iter().next())
    }

    /// Evaluates the sequence and returns its length.
    #[must_use]
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Returns `true` if the sequence yields nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Returns the first element satisfying `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Optional<T>
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
        self.iter().any(|element| predicate(&element))
    }

    /// Folds the elements in order.
    pub fn reduce<B, F>(&self, mut function: F, initial: B) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.iter().fold(initial, |accumulator, element| {
            function(accumulator, &element)
        })
    }

    /// Calls `callback` on every element in order.
    pub fn foreach<F>(&self, mut callback: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(|element| callback(&element));
    }

    /// Evaluates the sequence into a vector.
    #[must_use]
    pub fn to_array(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Evaluates the sequence into a list.
    #[must_use]
    pub fn to_list(&self) -> ImmutableList<T> {
        ImmutableList::from_vec(self.to_array())
    }

    /// Evaluates the sequence into a set.
    #[must_use]
    pub fn to_set(&self) -> ImmutableSet<T>
    where
        T: KeyHash + PartialEq,
    {
        ImmutableSet::from_array(self.iter())
    }
}

impl<T> Clone for IndexedSequence<T> {
    fn clone(&self) -> Self {
        Self {
            operation: Rc::clone(&self.operation),
        }
    }
}

impl<T: Clone + 'static> Default for IndexedSequence<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Clone + 'static> FromIterator<T> for IndexedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter)
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for IndexedSequence<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: 'static> HasToArray for IndexedSequence<T> {
    type Item = T;

    fn to_array(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<T: Clone + 'static> Constructible for IndexedSequence<T> {
    type Item = T;

    fn construct(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}
