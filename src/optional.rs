//! An optional value.
//!
//! [`Optional`] is the absent-or-present result returned by collection
//! lookups such as [`ImmutableMap::get`](crate::persistent::ImmutableMap::get).
//! It converts freely to and from [`Option`]; unwrapping an empty
//! `Optional` is a [`CollectionError::NoSuchElement`] rather than a panic.
//!
//! # Examples
//!
//! ```rust
//! use immutable_collections::Optional;
//!
//! let present = Optional::of(21).map(|value| value * 2);
//! assert_eq!(present.get(), Ok(&42));
//!
//! let absent: Optional<i32> = Optional::empty();
//! assert!(absent.get().is_err());
//! assert_eq!(absent.or_else(0), 0);
//! ```

use std::fmt;

use crate::error::{CollectionError, Result};
use crate::persistent::{ImmutableList, KeyHash};

/// A value that may be absent.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Optional<T>(Option<T>);

impl<T> Optional<T> {
    /// Wraps a present value.
    #[inline]
    #[must_use]
    pub const fn of(value: T) -> Self {
        Self(Some(value))
    }

    /// Returns the empty `Optional`.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(None)
    }

    /// Wraps an [`Option`].
    #[inline]
    #[must_use]
    pub const fn of_nullable(value: Option<T>) -> Self {
        Self(value)
    }

    /// Returns `true` if a value is present.
    #[inline]
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// Returns `true` if no value is present.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Returns a reference to the value.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NoSuchElement`] if the `Optional` is empty.
    pub fn get(&self) -> Result<&T> {
        self.0
            .as_ref()
            .ok_or(CollectionError::no_such_element("Optional", "get"))
    }

    /// Consumes the `Optional` and returns the value.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NoSuchElement`] if the `Optional` is empty.
    pub fn into_inner(self) -> Result<T> {
        self.0
            .ok_or(CollectionError::no_such_element("Optional", "into_inner"))
    }

    /// Returns the value, or `default` when empty.
    #[inline]
    pub fn or_else(self, default: T) -> T {
        self.0.unwrap_or(default)
    }

    /// Returns the value, or the result of `supplier` when empty.
    #[inline]
    pub fn or_else_get<F>(self, supplier: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.0.unwrap_or_else(supplier)
    }

    /// Transforms the value if present.
    #[inline]
    pub fn map<U, F>(self, function: F) -> Optional<U>
    where
        F: FnOnce(T) -> U,
    {
        Optional(self.0.map(function))
    }

    /// Transforms the value into another `Optional` if present.
    #[inline]
    pub fn flat_map<U, F>(self, function: F) -> Optional<U>
    where
        F: FnOnce(T) -> Optional<U>,
    {
        Optional(self.0.and_then(|value| function(value).0))
    }

    /// Keeps the value only if it satisfies `predicate`.
    #[inline]
    #[must_use]
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&T) -> bool,
    {
        Self(self.0.filter(predicate))
    }

    /// Calls `consumer` with the value if present.
    #[inline]
    pub fn if_present<F>(&self, consumer: F)
    where
        F: FnOnce(&T),
    {
        if let Some(value) = &self.0 {
            consumer(value);
        }
    }

    /// Borrows the value.
    #[inline]
    #[must_use]
    pub const fn as_ref(&self) -> Optional<&T> {
        Optional(self.0.as_ref())
    }

    /// Converts to a standard [`Option`].
    #[inline]
    #[must_use]
    pub fn to_option(self) -> Option<T> {
        self.0
    }
}

impl<T: Clone> Optional<T> {
    /// Returns a list with zero or one element.
    #[must_use]
    pub fn to_list(&self) -> ImmutableList<T> {
        self.0.iter().cloned().collect()
    }
}

impl<T: Clone> Optional<&T> {
    /// Maps an `Optional<&T>` to an `Optional<T>` by cloning.
    #[inline]
    #[must_use]
    pub fn cloned(self) -> Optional<T> {
        Optional(self.0.cloned())
    }
}

impl<T> Default for Optional<T> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Option<T>> for Optional<T> {
    #[inline]
    fn from(value: Option<T>) -> Self {
        Self(value)
    }
}

impl<T> From<Optional<T>> for Option<T> {
    #[inline]
    fn from(value: Optional<T>) -> Self {
        value.0
    }
}

impl<T> IntoIterator for Optional<T> {
    type Item = T;
    type IntoIter = std::option::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for Optional<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => formatter.debug_tuple("Optional").field(value).finish(),
            None => formatter.write_str("Optional.empty"),
        }
    }
}

impl<T: KeyHash> KeyHash for Optional<T> {
    fn key_hash(&self) -> u32 {
        self.0.key_hash()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for Optional<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde::Serialize::serialize(&self.0, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for Optional<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Self)
    }
}

// =============================================================================
// Tests
// =============================================================================
