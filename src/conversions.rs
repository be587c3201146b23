//! Cross-collection projections.
//!
//! Each function consumes a [`HasToArray`] source and produces the target
//! collection. The collections' own `to_list`, `to_set`, `to_map`, and
//! `to_seq` methods delegate here.
//!
//! # Examples
//!
//! ```rust
//! use immutable_collections::conversions;
//! use immutable_collections::persistent::{ImmutableList, ImmutableQueue};
//!
//! let queue = ImmutableQueue::of(["b", "a", "b"]);
//! let set = conversions::to_set(&queue);
//! assert_eq!(set.size(), 2);
//!
//! let list: ImmutableList<&str> = conversions::convert(&queue);
//! assert_eq!(list.to_array(), vec!["b", "a", "b"]);
//! ```

use crate::capability::{Constructible, HasToArray};
use crate::persistent::{ImmutableList, ImmutableMap, ImmutableSet, IndexedSequence, KeyHash};

/// Rebuilds `source` as any [`Constructible`] collection of the same items.
pub fn convert<S, D>(source: &S) -> D
where
    S: HasToArray + ?Sized,
    D: Constructible<Item = S::Item>,
{
    D::construct(source.to_array())
}

/// Projects `source` into an [`ImmutableList`], keeping its order.
pub fn to_list<S>(source: &S) -> ImmutableList<S::Item>
where
    S: HasToArray + ?Sized,
{
    ImmutableList::from_vec(source.to_array())
}

/// Projects `source` into an [`ImmutableSet`], collapsing duplicates.
pub fn to_set<S>(source: &S) -> ImmutableSet<S::Item>
where
    S: HasToArray + ?Sized,
    S::Item: KeyHash + PartialEq,
{
    ImmutableSet::from_array(source.to_array())
}

/// Projects `source` into an [`ImmutableMap`] keyed by `key_function`.
///
/// Later items win when two items produce the same key.
pub fn to_map_by<S, K, F>(source: &S, mut key_function: F) -> ImmutableMap<K, S::Item>
where
    S: HasToArray + ?Sized,
    K: KeyHash + PartialEq,
    F: FnMut(&S::Item) -> K,
{
    ImmutableMap::from_array(
        source
            .to_array()
            .into_iter()
            .map(|item| (key_function(&item), item)),
    )
}

/// Projects `source` into a lazy [`IndexedSequence`] over a snapshot of its items.
pub fn to_seq<S>(source: &S) -> IndexedSequence<S::Item>
where
    S: HasToArray + ?Sized,
    S::Item: Clone + 'static,
{
    IndexedSequence::from_vec(source.to_array())
}
