//! Persistent (immutable) hash map based on HAMT.
//!
//! This module provides [`ImmutableMap`], an immutable hash map that shares
//! structure between versions.
//!
//! # Overview
//!
//! `ImmutableMap` owns the root of a hash array mapped trie, or nothing at
//! all when it is empty. Each call hashes the key with the map's
//! [`KeyHasher`] and hands the hash to the root node, which routes it five
//! bits per level.
//!
//! - O(log32 N) `get`, `contains`, `add`, `remove` (at most 7 levels)
//! - O(1) `size` and `is_empty`
//! - O(N) `find`, `exists`, `filter`, `map`, `equals`, `to_array`
//!
//! Keys are identified by their 32-bit hash. Adding a key whose hash is
//! already present replaces the stored entry, even if the two keys differ
//! (last write wins). Enumeration order is hash order, not insertion order.
//!
//! # Examples
//!
//! ```rust
//! use immutable_collections::persistent::ImmutableMap;
//!
//! let map = ImmutableMap::from_array([(1, "a"), (2, "b"), (3, "c")]);
//! let removed = map.remove(&2);
//!
//! assert_eq!(removed.size(), 2);
//! assert_eq!(map.size(), 3); // Original unchanged
//! assert_eq!(removed.get(&1).to_option(), Some(&"a"));
//! assert!(removed.get(&2).is_empty());
//! ```

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::iter::{FromIterator, FusedIterator};

use super::node::{Entries, Node, NodeRef};
use super::{
    DefaultKeyHasher, ImmutableList, ImmutableSet, IndexedSequence, KeyHash, KeyHasher,
    RecordHasher, ReferenceCounter,
};
use crate::capability::{Constructible, HasToArray};
use crate::conversions;
use crate::optional::Optional;

// =============================================================================
// ImmutableMap Definition
// =============================================================================

/// A persistent (immutable) hash map based on HAMT.
///
/// # Time Complexity
///
/// | Operation  | Complexity |
/// |------------|------------|
/// | `new`      | O(1)       |
/// | `get`      | O(log32 N) |
/// | `add`      | O(log32 N) |
/// | `remove`   | O(log32 N) |
/// | `contains` | O(log32 N) |
/// | `size`     | O(1)       |
/// | `find`     | O(N)       |
///
/// # Examples
///
/// ```rust
/// use immutable_collections::persistent::ImmutableMap;
///
/// let map = ImmutableMap::singleton("key".to_string(), 42);
/// assert_eq!(map.get("key").to_option(), Some(&42));
/// ```
pub struct ImmutableMap<K, V, S = DefaultKeyHasher> {
    /// Root of the trie; `None` is the empty map.
    root: Option<NodeRef<K, V>>,
    /// Number of entries.
    length: usize,
    hasher: S,
}

impl<K, V> ImmutableMap<K, V> {
    /// Creates a new empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let map: ImmutableMap<String, i32> = ImmutableMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_hasher(DefaultKeyHasher)
    }

    /// Alias of [`ImmutableMap::new`].
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self::new()
    }
}

impl<K: KeyHash + PartialEq, V> ImmutableMap<K, V> {
    /// Creates a map containing a single entry.
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().add(key, value)
    }

    /// Builds a map from key/value pairs.
    ///
    /// Later pairs win over earlier pairs with the same key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let map = ImmutableMap::from_array([("a", 1), ("b", 2), ("a", 3)]);
    /// assert_eq!(map.size(), 2);
    /// assert_eq!(map.get(&"a").to_option(), Some(&3));
    /// ```
    #[must_use]
    pub fn from_array<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_array_with_hasher(entries, DefaultKeyHasher)
    }
}

impl<V> ImmutableMap<String, V> {
    /// Builds a string-keyed map from the named properties of a record.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let map = ImmutableMap::from_object([("host", "localhost"), ("port", "8080")]);
    /// assert_eq!(map.get("port").to_option(), Some(&"8080"));
    /// ```
    #[must_use]
    pub fn from_object<I, N>(object: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
    {
        Self::from_array(object.into_iter().map(|(name, value)| (name.into(), value)))
    }
}

impl<K, V, S> ImmutableMap<K, V, S> {
    /// Creates an empty map that hashes keys with `hasher`.
    #[inline]
    #[must_use]
    pub const fn with_hasher(hasher: S) -> Self {
        Self {
            root: None,
            length: 0,
            hasher,
        }
    }

    /// Returns the hashing strategy.
    #[inline]
    pub const fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `true` if the map contains at least one entry.
    #[inline]
    #[must_use]
    pub const fn is_not_empty(&self) -> bool {
        self.length != 0
    }

    /// Height of the underlying trie: 0 when empty, 1 for a lone entry.
    #[must_use]
    pub fn trie_depth(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.depth())
    }

    /// Returns an iterator over the entries, in hash order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let map = ImmutableMap::from_array([(1, 10), (2, 20)]);
    /// let total: i32 = map.iter().map(|(_, value)| value).sum();
    /// assert_eq!(total, 30);
    /// ```
    #[must_use]
    pub fn iter(&self) -> ImmutableMapIterator<'_, K, V> {
        let root = self.root.as_ref();
        let entries = root.map_or_else(Entries::empty, Node::entries);
        ImmutableMapIterator {
            entries,
            remaining: self.length,
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Returns the value stored for `key`.
    ///
    /// The key may be any borrowed form of the map's key type, provided the
    /// hasher produces the same hash for both forms.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let map = ImmutableMap::singleton("hello".to_string(), 42);
    /// assert_eq!(map.get("hello").to_option(), Some(&42));
    /// assert!(map.get("world").is_empty());
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Optional<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyHasher<Q>,
    {
        let hash = self.hasher.hash_key(key);
        Optional::of_nullable(self.root.as_ref().and_then(|root| root.get(hash, 0)))
    }

    /// Returns the value stored for `key`, or `default`.
    pub fn get_or_else<Q>(&self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyHasher<Q>,
        V: Clone,
    {
        self.get(key).cloned().or_else(default)
    }

    /// Returns `true` if the map holds an entry for `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyHasher<Q>,
    {
        let hash = self.hasher.hash_key(key);
        let root = self.root.as_ref();
        root.is_some_and(|node| node.contains(hash, 0))
    }

    /// Returns the first entry, in hash order, satisfying `predicate`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let map = ImmutableMap::from_array([("a", 1), ("b", 2)]);
    /// let found = map.find(|_, value| *value > 1);
    /// assert_eq!(found.to_option(), Some((&"b", &2)));
    /// ```
    pub fn find<P>(&self, mut predicate: P) -> Optional<(&K, &V)>
    where
        P: FnMut(&K, &V) -> bool,
    {
        let root = self.root.as_ref();
        Optional::of_nullable(root.and_then(|node| node.find(&mut predicate)))
    }

    /// Returns `true` if any entry satisfies `predicate`.
    pub fn exists<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.root
            .as_ref()
            .is_some_and(|root| root.exists(&mut predicate))
    }

    /// Calls `callback` on every entry, in hash order.
    pub fn foreach<F>(&self, mut callback: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self {
            callback(key, value);
        }
    }

    /// Folds every entry into an accumulator, in hash order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let map = ImmutableMap::from_array([("a", 1), ("b", 2), ("c", 3)]);
    /// let sum = map.reduce(|accumulator, _, value| accumulator + value, 0);
    /// assert_eq!(sum, 6);
    /// ```
    pub fn reduce<B, F>(&self, mut function: F, initial: B) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.iter().fold(initial, |accumulator, (key, value)| {
            function(accumulator, key, value)
        })
    }

    /// Returns a map with the same keys and transformed values.
    ///
    /// Every key keeps its place in the trie, so nothing is rehashed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let map = ImmutableMap::from_array([("a", 1), ("b", 2)]);
    /// let doubled = map.map_values(|value| value * 2);
    /// assert_eq!(doubled.get(&"b").to_option(), Some(&4));
    /// ```
    #[must_use]
    pub fn map_values<W, F>(&self, mut function: F) -> ImmutableMap<K, W, S>
    where
        K: Clone,
        S: Clone,
        F: FnMut(&V) -> W,
    {
        ImmutableMap {
            root: self
                .root
                .as_ref()
                .map(|root| root.map_values(&mut |_, value| function(value))),
            length: self.length,
            hasher: self.hasher.clone(),
        }
    }

    /// Returns the keys as a lazy sequence.
    #[must_use]
    pub fn key_seq(&self) -> IndexedSequence<K>
    where
        K: Clone + 'static,
    {
        IndexedSequence::from_vec(self.keys().cloned().collect())
    }

    /// Returns the values as a list, in hash order.
    #[must_use]
    pub fn value_list(&self) -> ImmutableList<V>
    where
        V: Clone,
    {
        self.values().cloned().collect()
    }

    /// Copies the entries into a vector, in hash order.
    #[must_use]
    pub fn to_array(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.root.as_ref().map_or_else(Vec::new, |root| {
            root.to_array()
                .into_iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
    }

    /// Projects the entries into a list of pairs.
    #[must_use]
    pub fn to_list(&self) -> ImmutableList<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        conversions::to_list(self)
    }

    /// Projects the entries into a set of pairs.
    #[must_use]
    pub fn to_set(&self) -> ImmutableSet<(K, V)>
    where
        K: Clone + KeyHash + PartialEq,
        V: Clone + KeyHash + PartialEq,
    {
        conversions::to_set(self)
    }

    /// Returns the set of keys.
    #[must_use]
    pub fn key_set(&self) -> ImmutableSet<K>
    where
        K: Clone + KeyHash + PartialEq,
    {
        self.keys().cloned().collect()
    }

    /// Converts to a string-keyed record, keys rendered with `Display`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let map = ImmutableMap::from_array([(1, "one"), (2, "two")]);
    /// let object = map.to_object();
    /// assert_eq!(object.get("2"), Some(&"two"));
    /// ```
    #[must_use]
    pub fn to_object(&self) -> BTreeMap<String, V>
    where
        K: fmt::Display,
        V: Clone,
    {
        self.iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    /// Compares two maps entry by entry with `comparator` on the values.
    ///
    /// Maps are equal when they have the same size and every key of `self`
    /// is present in `other` with a value accepted by `comparator`. Order
    /// plays no part.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let left = ImmutableMap::from_array([("a", 1.0_f64), ("b", 2.0)]);
    /// let right = ImmutableMap::from_array([("b", 2.0001_f64), ("a", 1.0)]);
    /// assert!(left.equals_with(&right, |x, y| (x - y).abs() < 0.01));
    /// assert!(!left.equals(&right));
    /// ```
    pub fn equals_with<F>(&self, other: &Self, mut comparator: F) -> bool
    where
        S: KeyHasher<K>,
        F: FnMut(&V, &V) -> bool,
    {
        if self.length != other.length {
            return false;
        }
        let Some(other_root) = &other.root else {
            return self.root.is_none();
        };
        self.iter().all(|(key, value)| {
            other_root
                .get(other.hasher.hash_key(key), 0)
                .is_some_and(|other_value| comparator(value, other_value))
        })
    }

    /// Compares two maps with `==` on the values.
    pub fn equals(&self, other: &Self) -> bool
    where
        S: KeyHasher<K>,
        V: PartialEq,
    {
        self.equals_with(other, |left, right| left == right)
    }
}

impl<K, V, S> ImmutableMap<K, V, S>
where
    K: PartialEq,
    S: KeyHasher<K> + Clone,
{
    /// Builds a map from key/value pairs using `hasher`.
    #[must_use]
    pub fn from_array_with_hasher<I>(entries: I, hasher: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_hasher(hasher);
        for (key, value) in entries {
            map = map.add(key, value);
        }
        tracing::trace!(size = map.length, "built map from entries");
        map
    }

    /// Returns a map with `key` bound to `value`.
    ///
    /// If an entry with the same hash exists it is replaced.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let map1 = ImmutableMap::new().add("key".to_string(), 1);
    /// let map2 = map1.add("key".to_string(), 2);
    ///
    /// assert_eq!(map1.get("key").to_option(), Some(&1)); // Original unchanged
    /// assert_eq!(map2.get("key").to_option(), Some(&2)); // New version
    /// ```
    #[must_use]
    pub fn add(&self, key: K, value: V) -> Self {
        let hash = self.hasher.hash_key(&key);
        let (root, added) = match &self.root {
            None => (Node::leaf(hash, key, value), true),
            Some(root) => Node::add(root, hash, 0, key, value),
        };
        Self {
            root: Some(root),
            length: if added { self.length + 1 } else { self.length },
            hasher: self.hasher.clone(),
        }
    }

    /// Returns a map without `key`.
    ///
    /// Removing an absent key returns a map sharing the original root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let map = ImmutableMap::from_array([("a", 1), ("b", 2)]);
    /// let removed = map.remove(&"a");
    ///
    /// assert_eq!(map.size(), 2);
    /// assert_eq!(removed.size(), 1);
    /// assert!(!removed.contains(&"a"));
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: ?Sized,
        S: KeyHasher<Q>,
    {
        self.remove_hash(self.hasher.hash_key(key))
    }

    fn remove_hash(&self, hash: u32) -> Self {
        let Some(root) = &self.root else {
            return self.clone();
        };
        match Node::remove(root, hash, 0) {
            Some(new_root) if ReferenceCounter::ptr_eq(&new_root, root) => self.clone(),
            Some(new_root) => Self {
                root: Some(new_root),
                length: self.length - 1,
                hasher: self.hasher.clone(),
            },
            None => {
                tracing::trace!("last entry removed, trie collapsed to the empty root");
                Self::with_hasher(self.hasher.clone())
            }
        }
    }

    /// Returns a map holding only the entries satisfying `predicate`.
    ///
    /// Rejected entries are removed from `self`, so surviving subtrees are
    /// shared with the original.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&K, &V) -> bool,
    {
        let rejected: Vec<u32> = self
            .iter()
            .filter(|&(key, value)| !predicate(key, value))
            .map(|(key, _)| self.hasher.hash_key(key))
            .collect();
        rejected
            .into_iter()
            .fold(self.clone(), |map, hash| map.remove_hash(hash))
    }

    /// Returns a map of transformed entries.
    ///
    /// Entries mapping to the same key collapse, last in hash order wins.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let map = ImmutableMap::from_array([(1, "a"), (2, "b")]);
    /// let swapped = map.map(|key, value| (value.to_string(), *key));
    /// assert_eq!(swapped.get("b").to_option(), Some(&2));
    /// ```
    #[must_use]
    pub fn map<K2, V2, F>(&self, mut mapper: F) -> ImmutableMap<K2, V2, S>
    where
        K2: PartialEq,
        S: KeyHasher<K2>,
        F: FnMut(&K, &V) -> (K2, V2),
    {
        ImmutableMap::from_array_with_hasher(
            self.iter().map(|(key, value)| mapper(key, value)),
            self.hasher.clone(),
        )
    }

    /// Returns a map with transformed keys and the same values.
    #[must_use]
    pub fn map_keys<K2, F>(&self, mut mapper: F) -> ImmutableMap<K2, V, S>
    where
        K2: PartialEq,
        S: KeyHasher<K2>,
        V: Clone,
        F: FnMut(&K) -> K2,
    {
        self.map(|key, value| (mapper(key), value.clone()))
    }

    /// Returns a map with `function` applied to the value of `key`.
    ///
    /// Returns an unchanged map when `key` is absent.
    #[must_use]
    pub fn update<F>(&self, key: K, function: F) -> Self
    where
        F: FnOnce(&V) -> V,
    {
        self.get(&key).to_option().map_or_else(
            || self.clone(),
            |value| {
                let updated = function(value);
                self.add(key, updated)
            },
        )
    }

    /// Merges two maps; entries of `other` win on conflicting keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutable_collections::persistent::ImmutableMap;
    ///
    /// let left = ImmutableMap::from_array([("a", 1), ("b", 2)]);
    /// let right = ImmutableMap::from_array([("b", 20), ("c", 3)]);
    /// let merged = left.merge(&right);
    ///
    /// assert_eq!(merged.size(), 3);
    /// assert_eq!(merged.get(&"b").to_option(), Some(&20));
    /// ```
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self
    where
        K: Clone,
        V: Clone,
    {
        other.iter().fold(self.clone(), |map, (key, value)| {
            map.add(key.clone(), value.clone())
        })
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the entries of an [`ImmutableMap`], in hash order.
pub struct ImmutableMapIterator<'a, K, V> {
    entries: Entries<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iterator for ImmutableMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for ImmutableMapIterator<'_, K, V> {}

impl<K, V> FusedIterator for ImmutableMapIterator<'_, K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, S: Clone> Clone for ImmutableMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            length: self.length,
            hasher: self.hasher.clone(),
        }
    }
}

impl<K, V, S: Default> Default for ImmutableMap<K, V, S> {
    #[inline]
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> FromIterator<(K, V)> for ImmutableMap<K, V, S>
where
    K: PartialEq,
    S: KeyHasher<K> + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_array_with_hasher(iter, S::default())
    }
}

impl<'a, K, V, S> IntoIterator for &'a ImmutableMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = ImmutableMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone, V: Clone, S> IntoIterator for ImmutableMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.to_array().into_iter()
    }
}

impl<K, V: PartialEq, S: KeyHasher<K>> PartialEq for ImmutableMap<K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<K, V: Eq, S: KeyHasher<K>> Eq for ImmutableMap<K, V, S> {}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ImmutableMap<K, V, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

/// Hashes the map as a record of its entries, independent of trie layout.
impl<K: KeyHash, V: KeyHash, S> KeyHash for ImmutableMap<K, V, S> {
    fn key_hash(&self) -> u32 {
        self.iter()
            .fold(RecordHasher::new("ImmutableMap"), |record, (key, value)| {
                record.field_hash(key.key_hash().to_string(), value.key_hash())
            })
            .finish()
    }
}

// =============================================================================
// Capability Implementations
// =============================================================================

impl<K: Clone, V: Clone, S> HasToArray for ImmutableMap<K, V, S> {
    type Item = (K, V);

    fn to_array(&self) -> Vec<(K, V)> {
        Self::to_array(self)
    }

    fn size(&self) -> usize {
        self.length
    }
}

impl<K, V, S> Constructible for ImmutableMap<K, V, S>
where
    K: PartialEq,
    S: KeyHasher<K> + Clone + Default,
{
    type Item = (K, V);

    fn construct(items: Vec<(K, V)>) -> Self {
        items.into_iter().collect()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K: serde::Serialize, V: serde::Serialize, S> serde::Serialize for ImmutableMap<K, V, S> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

#[cfg(feature = "serde")]
struct ImmutableMapVisitor<K, V, S> {
    marker: std::marker::PhantomData<ImmutableMap<K, V, S>>,
}

#[cfg(feature = "serde")]
impl<K, V, S> ImmutableMapVisitor<K, V, S> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, S> serde::de::Visitor<'de> for ImmutableMapVisitor<K, V, S>
where
    K: serde::Deserialize<'de> + PartialEq,
    V: serde::Deserialize<'de>,
    S: KeyHasher<K> + Clone + Default,
{
    type Value = ImmutableMap<K, V, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = ImmutableMap::default();
        while let Some((key, value)) = access.next_entry()? {
            map = map.add(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, S> serde::Deserialize<'de> for ImmutableMap<K, V, S>
where
    K: serde::Deserialize<'de> + PartialEq,
    V: serde::Deserialize<'de>,
    S: KeyHasher<K> + Clone + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(ImmutableMapVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistent::node::tests::assert_invariants;
    use rstest::rstest;

    /// Sends every key to the same hash.
    #[derive(Clone, Default)]
    struct ConstantHasher;

    impl<K: ?Sized> KeyHasher<K> for ConstantHasher {
        fn hash_key(&self, _: &K) -> u32 {
            0xDEAD_BEEF
        }
    }

    fn check<K, V, S>(map: &ImmutableMap<K, V, S>) {
        let counted = map
            .root
            .as_ref()
            .map_or(0, |root| assert_invariants(root, 0));
        assert_eq!(counted, map.size());
    }

    #[rstest]
    fn test_new_creates_empty() {
        let map: ImmutableMap<String, i32> = ImmutableMap::new();
        assert!(map.is_empty());
        assert!(!map.is_not_empty());
        assert_eq!(map.size(), 0);
        assert_eq!(map.trie_depth(), 0);
        assert!(map.root.is_none());
    }

    #[rstest]
    fn test_add_and_get() {
        let map = ImmutableMap::new()
            .add("one".to_string(), 1)
            .add("two".to_string(), 2);

        assert_eq!(map.size(), 2);
        assert_eq!(map.get("one").to_option(), Some(&1));
        assert_eq!(map.get("two").to_option(), Some(&2));
        assert!(map.get("three").is_empty());
        check(&map);
    }

    #[rstest]
    fn test_add_overwrites_same_key() {
        let map1 = ImmutableMap::singleton("key".to_string(), 1);
        let map2 = map1.add("key".to_string(), 2);

        assert_eq!(map1.get("key").to_option(), Some(&1));
        assert_eq!(map2.get("key").to_option(), Some(&2));
        assert_eq!(map2.size(), 1);
    }

    #[rstest]
    fn test_remove_scenario() {
        let map = ImmutableMap::from_array([(1, 'a'), (2, 'b'), (3, 'c')]);
        let removed = map.remove(&2);

        let mut entries = removed.to_array();
        entries.sort_unstable();
        assert_eq!(entries, vec![(1, 'a'), (3, 'c')]);
        assert_eq!(removed.size(), 2);
        assert_eq!(map.size(), 3);
        check(&removed);
    }

    #[rstest]
    fn test_to_array_follows_iteration_order() {
        let map: ImmutableMap<i32, char> = (0..100).map(|index| (index * 37, 'x')).collect();
        let walked: Vec<(i32, char)> = map.iter().map(|(key, value)| (*key, *value)).collect();

        assert_eq!(map.to_array(), walked);
        assert!(ImmutableMap::<i32, char>::new().to_array().is_empty());
    }

    #[rstest]
    fn test_remove_absent_shares_root() {
        let map = ImmutableMap::from_array([(1, 'a'), (2, 'b')]);
        let same = map.remove(&99);

        assert_eq!(same.size(), 2);
        assert!(ReferenceCounter::ptr_eq(
            map.root.as_ref().unwrap(),
            same.root.as_ref().unwrap()
        ));
        assert!(same.equals(&map));
    }

    #[rstest]
    fn test_add_shares_untouched_subtrees() {
        let map: ImmutableMap<i32, i32> = (0..64).map(|index| (index, index)).collect();
        let before = map.to_array();
        let extended = map.add(1000, 1000);

        assert_eq!(map.to_array(), before);
        assert_eq!(extended.size(), 65);

        let (Some(old_root), Some(new_root)) = (&map.root, &extended.root) else {
            panic!("both maps are populated");
        };
        match (old_root.as_ref(), new_root.as_ref()) {
            (Node::Branch { children: old, .. }, Node::Branch { children: new, .. }) => {
                let shared = old
                    .iter()
                    .zip(new.iter())
                    .filter(|(left, right)| ReferenceCounter::ptr_eq(left, right))
                    .count();
                assert_eq!(shared, old.len() - 1);
            }
            _ => panic!("expected branch roots"),
        }
    }

    #[rstest]
    fn test_collision_last_write_wins() {
        let map = ImmutableMap::with_hasher(ConstantHasher)
            .add("first".to_string(), 1)
            .add("second".to_string(), 2);

        assert_eq!(map.size(), 1);
        assert_eq!(map.get("first").to_option(), Some(&2));
        assert_eq!(map.get("second").to_option(), Some(&2));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec![&"second".to_string()]);
    }

    #[rstest]
    fn test_removing_everything_collapses_height() {
        let keys: Vec<String> = (0..500).map(|index| format!("key-{index}")).collect();
        let mut map: ImmutableMap<String, usize> = keys
            .iter()
            .enumerate()
            .map(|(index, key)| (key.clone(), index))
            .collect();
        assert_eq!(map.size(), 500);
        assert!(map.trie_depth() >= 2);

        for key in &keys {
            map = map.remove(key);
            check(&map);
        }

        assert_eq!(map.size(), 0);
        assert!(map.root.is_none());

        let revived = map.add("again".to_string(), 1);
        assert_eq!(revived.trie_depth(), 1);
        assert_eq!(revived.size(), 1);
    }

    #[rstest]
    fn test_find_exists_foreach_reduce() {
        let map = ImmutableMap::from_array([("a", 1), ("b", 2), ("c", 3)]);

        assert_eq!(map.find(|key, _| *key == "c").to_option(), Some((&"c", &3)));
        assert!(map.find(|_, value| *value > 3).is_empty());
        assert!(map.exists(|_, value| *value == 2));
        assert!(!ImmutableMap::<i32, i32>::new().exists(|_, _| true));

        let mut visited = Vec::new();
        map.foreach(|key, _| visited.push(*key));
        visited.sort_unstable();
        assert_eq!(visited, vec!["a", "b", "c"]);

        assert_eq!(map.reduce(|total, _, value| total + value, 10), 16);
    }

    #[rstest]
    fn test_filter_shares_structure_and_keeps_matches() {
        let map: ImmutableMap<i32, i32> = (0..100).map(|index| (index, index * 2)).collect();
        let even = map.filter(|key, _| key % 2 == 0);

        assert_eq!(even.size(), 50);
        assert!(even.contains(&42));
        assert!(!even.contains(&43));
        assert_eq!(map.size(), 100);
        check(&even);
    }

    #[rstest]
    fn test_map_and_map_keys() {
        let map = ImmutableMap::from_array([(1, 10), (2, 20)]);

        let shifted = map.map(|key, value| (key + 100, value + 1));
        assert_eq!(shifted.get(&101).to_option(), Some(&11));
        assert_eq!(shifted.get(&102).to_option(), Some(&21));

        let collapsed = map.map_keys(|_| 0);
        assert_eq!(collapsed.size(), 1);
    }

    #[rstest]
    fn test_map_values_keeps_layout() {
        let map: ImmutableMap<i32, i32> = (0..40).map(|index| (index, index)).collect();
        let labelled = map.map_values(|value| format!("#{value}"));
        assert_eq!(labelled.size(), 40);
        assert_eq!(labelled.trie_depth(), map.trie_depth());
        assert_eq!(labelled.get(&39).to_option(), Some(&"#39".to_string()));
        check(&labelled);
    }

    #[rstest]
    fn test_update_and_get_or_else() {
        let map = ImmutableMap::singleton("count".to_string(), 10);
        let updated = map.update("count".to_string(), |value| value + 1);
        let untouched = map.update("missing".to_string(), |value| value + 1);

        assert_eq!(updated.get("count").to_option(), Some(&11));
        assert_eq!(untouched.size(), 1);
        assert_eq!(map.get_or_else("missing", 0), 0);
        assert_eq!(map.get_or_else("count", 0), 10);
    }

    #[rstest]
    fn test_merge_prefers_other() {
        let left = ImmutableMap::from_array([("a", 1), ("b", 2)]);
        let right = ImmutableMap::from_array([("b", 3), ("c", 4)]);
        let merged = left.merge(&right);

        assert_eq!(merged.size(), 3);
        assert_eq!(merged.get(&"b").to_option(), Some(&3));
    }

    #[rstest]
    fn test_equals_is_order_independent() {
        let forward: ImmutableMap<i32, i32> = (0..50).map(|index| (index, index)).collect();
        let backward: ImmutableMap<i32, i32> = (0..50).rev().map(|index| (index, index)).collect();
        let different = forward.add(3, -3);

        assert_eq!(forward, backward);
        assert_ne!(forward, different);
        assert_ne!(forward, forward.remove(&0));
    }

    #[rstest]
    fn test_conversions() {
        let map = ImmutableMap::from_array([(1, "one"), (2, "two")]);

        assert_eq!(map.to_list().size(), 2);
        assert!(map.to_set().contains(&(1, "one")));
        assert!(map.key_set().contains(&2));
        assert_eq!(map.key_seq().count(), 2);
        assert!(map.value_list().contains(&"two"));
        assert_eq!(map.to_object().get("1"), Some(&"one"));
    }

    #[rstest]
    fn test_from_object() {
        let map = ImmutableMap::from_object([("x", 1), ("y", 2)]);
        assert_eq!(map.get("x").to_option(), Some(&1));
        assert_eq!(map.to_object().len(), 2);
    }

    #[rstest]
    fn test_iterator_is_exact() {
        let map: ImmutableMap<i32, i32> = (0..10).map(|index| (index, index)).collect();
        let mut iterator = map.iter();
        assert_eq!(iterator.len(), 10);
        iterator.next();
        assert_eq!(iterator.len(), 9);
        assert_eq!(iterator.count(), 9);
    }

    #[rstest]
    fn test_key_hash_ignores_insertion_order() {
        let forward = ImmutableMap::from_array([("a", 1), ("b", 2)]);
        let backward = ImmutableMap::from_array([("b", 2), ("a", 1)]);
        let other = ImmutableMap::from_array([("a", 1), ("b", 3)]);

        assert_eq!(forward.key_hash(), backward.key_hash());
        assert_ne!(forward.key_hash(), other.key_hash());
    }

    #[rstest]
    fn test_debug() {
        let map = ImmutableMap::singleton(1, "one");
        assert_eq!(format!("{map:?}"), "{1: \"one\"}");
    }
}
