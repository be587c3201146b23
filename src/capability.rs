//! Narrow capabilities shared by every collection.
//!
//! Cross-collection conversions (`to_list`, `to_set`, `to_map_by`, ...) are
//! written once in [`conversions`](crate::conversions) against these two
//! traits instead of against each concrete collection.
//!
//! # Examples
//!
//! ```rust
//! use immutable_collections::capability::{Constructible, HasToArray};
//! use immutable_collections::persistent::{ImmutableList, ImmutableStack};
//!
//! fn rebuild<S, D>(source: &S) -> D
//! where
//!     S: HasToArray,
//!     D: Constructible<Item = S::Item>,
//! {
//!     D::construct(source.to_array())
//! }
//!
//! let stack = ImmutableStack::of([1, 2, 3]);
//! let list: ImmutableList<i32> = rebuild(&stack);
//! assert_eq!(list.to_array(), vec![1, 2, 3]);
//! ```

/// A collection that can enumerate its elements into a `Vec`.
pub trait HasToArray {
    /// The element type produced.
    type Item;

    /// Returns the elements in the collection's enumeration order.
    fn to_array(&self) -> Vec<Self::Item>;

    /// Returns the number of elements.
    fn size(&self) -> usize {
        self.to_array().len()
    }
}

/// A collection that can be built from a `Vec` of elements.
pub trait Constructible: Sized {
    /// The element type consumed.
    type Item;

    /// Builds the collection from `items`, in order.
    fn construct(items: Vec<Self::Item>) -> Self;
}

impl<T: Clone> HasToArray for Vec<T> {
    type Item = T;

    fn to_array(&self) -> Self {
        self.clone()
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl<T> Constructible for Vec<T> {
    type Item = T;

    fn construct(items: Self) -> Self {
        items
    }
}
