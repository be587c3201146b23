//! Persistent (immutable) collections.
//!
//! Every operation that looks like a mutation returns a new collection and
//! leaves the receiver untouched. Unchanged structure is shared between the
//! old and the new version instead of being copied.
//!
//! - [`ImmutableMap`]: hash map backed by a hash array mapped trie (HAMT)
//! - [`ImmutableSet`]: hash set backed by the same trie
//! - [`ImmutableList`]: array-backed list, copy-on-write
//! - [`ImmutableStack`]: LIFO stack over a shared singly-linked list
//! - [`ImmutableQueue`]: FIFO queue built from two stacks
//! - [`IndexedSequence`]: lazy, re-iterable view over any of the above
//!
//! # The trie
//!
//! Keys are reduced to 32-bit hashes by a [`KeyHasher`]. The trie consumes
//! the hash five bits per level, so a branch node has up to 32 children,
//! stored compacted and addressed through a [`Bitmap`]. An insert or a
//! removal copies only the nodes on the path from the root to the affected
//! leaf, at most seven of them.
//!
//! ```text
//! root ─ Branch{bitmap: bits 0, 3}
//!          ├─ Leaf{hash: …00000_00000}
//!          └─ Branch{bitmap: bits 1, 2}        shared by every later version
//!               ├─ Leaf{hash: …00001_00011}    that does not touch digit 3
//!               └─ Leaf{hash: …00010_00011}
//! ```
//!
//! # Examples
//!
//! ```rust
//! use immutable_collections::persistent::ImmutableMap;
//!
//! let map = ImmutableMap::from_array([(1, "a"), (2, "b"), (3, "c")]);
//! let smaller = map.remove(&2);
//!
//! assert_eq!(map.size(), 3);      // Original unchanged
//! assert_eq!(smaller.size(), 2);  // New version
//! assert!(!smaller.contains(&2));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`, and the
/// collections can be shared across threads.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod bitmap;
mod hasher;
mod list;
mod map;
mod node;
mod queue;
mod sequence;
mod set;
mod stack;

pub use bitmap::BITS_PER_LEVEL;
pub use bitmap::BRANCHING_FACTOR;
pub use bitmap::Bitmap;
pub use bitmap::HASH_BITS;
pub use hasher::DefaultKeyHasher;
pub use hasher::KeyHash;
pub use hasher::KeyHasher;
pub use hasher::RecordHasher;
pub use hasher::avalanche;
pub use hasher::hash_sequence;
pub use hasher::hash_string;
pub use hasher::hash_text;
pub use hasher::xxhash32;
pub use list::ImmutableList;
pub use list::ImmutableListIntoIterator;
pub use map::ImmutableMap;
pub use map::ImmutableMapIterator;
pub use queue::ImmutableQueue;
pub use queue::ImmutableQueueIterator;
pub use sequence::IndexedSequence;
pub use set::ImmutableSet;
pub use set::ImmutableSetIterator;
pub use stack::ImmutableStack;
pub use stack::ImmutableStackIterator;

// =============================================================================
// Thread Safety
// =============================================================================

#[cfg(feature = "arc")]
mod send_sync_verification {
    use super::{
        ImmutableList, ImmutableMap, ImmutableQueue, ImmutableSet, ImmutableStack, IndexedSequence,
    };

    static_assertions::assert_impl_all!(ImmutableMap<String, i32>: Send, Sync);
    static_assertions::assert_impl_all!(ImmutableSet<String>: Send, Sync);
    static_assertions::assert_impl_all!(ImmutableList<i32>: Send, Sync);
    static_assertions::assert_impl_all!(ImmutableStack<i32>: Send, Sync);
    static_assertions::assert_impl_all!(ImmutableQueue<i32>: Send, Sync);
    static_assertions::assert_not_impl_any!(IndexedSequence<i32>: Send, Sync);
}

#[cfg(not(feature = "arc"))]
mod local_only_verification {
    use super::{ImmutableMap, ImmutableSet};

    static_assertions::assert_not_impl_any!(ImmutableMap<String, i32>: Send, Sync);
    static_assertions::assert_not_impl_any!(ImmutableSet<String>: Send, Sync);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod reference_counter_tests {
    use super::ReferenceCounter;
    use rstest::rstest;

    #[rstest]
    fn test_reference_counter_strong_count() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
        let reference_counter_clone = reference_counter.clone();
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 2);
        drop(reference_counter_clone);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
    }
}
