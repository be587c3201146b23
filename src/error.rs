//! Error types for collection operations.
//!
//! Absence is never an error in this crate: lookups return
//! [`Optional`](crate::Optional) or `Option`. The errors here cover the few
//! operations whose contract has no sensible absent value, such as peeking
//! an empty stack or writing past the end of a list.

/// The ways a collection operation can fail.
///
/// # Examples
///
/// ```rust
/// use immutable_collections::CollectionError;
///
/// let error = CollectionError::NoSuchElement {
///     collection: "ImmutableStack",
///     operation: "peek",
/// };
/// assert_eq!(format!("{error}"), "ImmutableStack::peek: no such element");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// The operation needs an element but the receiver holds none.
    NoSuchElement {
        /// The collection type the operation was called on.
        collection: &'static str,
        /// The operation that was called.
        operation: &'static str,
    },
    /// An index lies outside the valid range of a list.
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The length of the list at the time of the call.
        length: usize,
    },
}

impl CollectionError {
    pub(crate) const fn no_such_element(collection: &'static str, operation: &'static str) -> Self {
        Self::NoSuchElement {
            collection,
            operation,
        }
    }

    pub(crate) const fn index_out_of_bounds(index: usize, length: usize) -> Self {
        Self::IndexOutOfBounds { index, length }
    }
}

impl std::fmt::Display for CollectionError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSuchElement {
                collection,
                operation,
            } => write!(formatter, "{collection}::{operation}: no such element"),
            Self::IndexOutOfBounds { index, length } => {
                write!(formatter, "index {index} out of bounds for length {length}")
            }
        }
    }
}

impl std::error::Error for CollectionError {}

/// Result type for fallible collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;
