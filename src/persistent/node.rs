//! Trie nodes of the hash array mapped trie.
//!
//! A trie is either absent (the empty collection) or a [`Node`]. Nodes are
//! immutable once built and are shared through [`NodeRef`] by every version
//! of a collection that contains them. `add` and `remove` rebuild only the
//! path from the node they are called on down to the affected leaf.
//!
//! Identity inside the trie is the full 32-bit hash: a lookup matches a
//! leaf when the hashes are equal, and adding a pair whose hash is already
//! present replaces the stored pair. Two leaves of one trie therefore never
//! share a hash, and two distinct hashes always differ in some 5-bit digit
//! at or below shift 30, so splitting always terminates before the hash
//! bits run out.

use std::slice;

use super::ReferenceCounter;
use super::bitmap::{BITS_PER_LEVEL, Bitmap, HASH_BITS};

/// Shared handle to a node.
pub(crate) type NodeRef<K, V> = ReferenceCounter<Node<K, V>>;

/// A node of the trie.
pub(crate) enum Node<K, V> {
    /// Exactly one key/value pair.
    Leaf { hash: u32, key: K, value: V },
    /// Up to 32 children, compacted in ascending bit order.
    ///
    /// `children.len() == bitmap.count()` and is never zero. A branch with
    /// a single child never has a leaf as that child.
    Branch {
        bitmap: Bitmap,
        children: Box<[NodeRef<K, V>]>,
    },
}

impl<K, V> Node<K, V> {
    /// Creates a shared leaf.
    pub(crate) fn leaf(hash: u32, key: K, value: V) -> NodeRef<K, V> {
        ReferenceCounter::new(Self::Leaf { hash, key, value })
    }

    fn branch(bitmap: Bitmap, children: Vec<NodeRef<K, V>>) -> NodeRef<K, V> {
        debug_assert_eq!(bitmap.count(), children.len());
        ReferenceCounter::new(Self::Branch {
            bitmap,
            children: children.into_boxed_slice(),
        })
    }

    const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Returns the entry stored under `hash`.
    pub(crate) fn get_entry(&self, hash: u32, shift: u32) -> Option<(&K, &V)> {
        match self {
            Self::Leaf {
                hash: stored,
                key,
                value,
            } => (*stored == hash).then_some((key, value)),
            Self::Branch { bitmap, children } => {
                let bitpos = Bitmap::bitpos(hash, shift);
                if bitmap.has(bitpos) {
                    children[bitmap.index(bitpos)].get_entry(hash, shift + BITS_PER_LEVEL)
                } else {
                    None
                }
            }
        }
    }

    /// Returns the value stored under `hash`.
    pub(crate) fn get(&self, hash: u32, shift: u32) -> Option<&V> {
        self.get_entry(hash, shift).map(|(_, value)| value)
    }

    /// Returns `true` if a leaf with `hash` is reachable from this node.
    pub(crate) fn contains(&self, hash: u32, shift: u32) -> bool {
        self.get_entry(hash, shift).is_some()
    }

    /// Returns the first entry, in enumeration order, satisfying `predicate`.
    ///
    /// Unlike the hash-routed lookups this scans every child.
    pub(crate) fn find<P>(&self, predicate: &mut P) -> Option<(&K, &V)>
    where
        P: FnMut(&K, &V) -> bool,
    {
        match self {
            Self::Leaf { key, value, .. } => predicate(key, value).then_some((key, value)),
            Self::Branch { children, .. } => children
                .iter()
                .find_map(|child| child.find(&mut *predicate)),
        }
    }

    /// Returns `true` if any entry satisfies `predicate`.
    pub(crate) fn exists<P>(&self, predicate: &mut P) -> bool
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.find(predicate).is_some()
    }

    /// Flattens the subtree into its entries, in bit-rank order.
    pub(crate) fn to_array(&self) -> Vec<(&K, &V)> {
        let mut entries = Vec::new();
        self.collect_entries(&mut entries);
        entries
    }

    fn collect_entries<'a>(&'a self, entries: &mut Vec<(&'a K, &'a V)>) {
        match self {
            Self::Leaf { key, value, .. } => entries.push((key, value)),
            Self::Branch { children, .. } => {
                for child in children {
                    child.collect_entries(entries);
                }
            }
        }
    }

    /// Height of the subtree: 1 for a leaf.
    pub(crate) fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Branch { children, .. } => {
                let deepest = children.iter().map(|child| child.depth()).max();
                1 + deepest.unwrap_or(0)
            }
        }
    }

    /// Rebuilds the subtree with mapped values, keeping every hash in place.
    pub(crate) fn map_values<W, F>(&self, function: &mut F) -> NodeRef<K, W>
    where
        K: Clone,
        F: FnMut(&K, &V) -> W,
    {
        match self {
            Self::Leaf { hash, key, value } => {
                let mapped = function(key, value);
                Node::leaf(*hash, key.clone(), mapped)
            }
            Self::Branch { bitmap, children } => Node::branch(
                *bitmap,
                children
                    .iter()
                    .map(|child| child.map_values(function))
                    .collect(),
            ),
        }
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Returns a node with `key`/`value` stored under `hash`.
    ///
    /// The flag is `true` when the pair was added and `false` when it
    /// replaced the pair previously stored under the same hash.
    pub(crate) fn add(
        this: &NodeRef<K, V>,
        hash: u32,
        shift: u32,
        key: K,
        value: V,
    ) -> (NodeRef<K, V>, bool)
    where
        K: PartialEq,
    {
        match this.as_ref() {
            Self::Leaf {
                hash: stored,
                key: stored_key,
                ..
            } => {
                if *stored == hash {
                    if *stored_key != key {
                        tracing::debug!(
                            hash,
                            shift,
                            "distinct keys share a hash; replacing the stored entry"
                        );
                    }
                    (Self::leaf(hash, key, value), false)
                } else {
                    let incoming = Self::leaf(hash, key, value);
                    let split = Self::split(this.clone(), *stored, incoming, hash, shift);
                    (split, true)
                }
            }
            Self::Branch { bitmap, children } => {
                let bitpos = Bitmap::bitpos(hash, shift);
                let index = bitmap.index(bitpos);

                if bitmap.has(bitpos) {
                    let (child, added) =
                        Self::add(&children[index], hash, shift + BITS_PER_LEVEL, key, value);
                    let mut new_children = children.to_vec();
                    new_children[index] = child;
                    (Self::branch(*bitmap, new_children), added)
                } else {
                    let mut new_children = Vec::with_capacity(children.len() + 1);
                    new_children.extend_from_slice(&children[..index]);
                    new_children.push(Self::leaf(hash, key, value));
                    new_children.extend_from_slice(&children[index..]);
                    (Self::branch(bitmap.next(bitpos), new_children), true)
                }
            }
        }
    }

    /// Builds the smallest subtree holding two leaves with distinct hashes.
    ///
    /// While both hashes share the digit at `shift`, a single-child branch
    /// is emitted and the split continues one level down.
    fn split(
        existing: NodeRef<K, V>,
        existing_hash: u32,
        incoming: NodeRef<K, V>,
        incoming_hash: u32,
        shift: u32,
    ) -> NodeRef<K, V> {
        debug_assert_ne!(existing_hash, incoming_hash);
        debug_assert!(
            shift < HASH_BITS,
            "distinct hashes must diverge within 32 bits"
        );

        let existing_bitpos = Bitmap::bitpos(existing_hash, shift);
        let incoming_bitpos = Bitmap::bitpos(incoming_hash, shift);

        if existing_bitpos == incoming_bitpos {
            let child = Self::split(
                existing,
                existing_hash,
                incoming,
                incoming_hash,
                shift + BITS_PER_LEVEL,
            );
            Self::branch(existing_bitpos, vec![child])
        } else {
            let bitmap = Bitmap::EMPTY.next(existing_bitpos).next(incoming_bitpos);
            let children = if existing_bitpos.bits() < incoming_bitpos.bits() {
                vec![existing, incoming]
            } else {
                vec![incoming, existing]
            };
            Self::branch(bitmap, children)
        }
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Returns the node without the leaf stored under `hash`.
    ///
    /// `None` means nothing is left. When `hash` is not present the original
    /// handle is returned, so callers detect a no-op with `ptr_eq`.
    pub(crate) fn remove(this: &NodeRef<K, V>, hash: u32, shift: u32) -> Option<NodeRef<K, V>> {
        match this.as_ref() {
            Self::Leaf { hash: stored, .. } => {
                if *stored == hash {
                    None
                } else {
                    Some(this.clone())
                }
            }
            Self::Branch { bitmap, children } => {
                let bitpos = Bitmap::bitpos(hash, shift);
                if !bitmap.has(bitpos) {
                    return Some(this.clone());
                }

                let index = bitmap.index(bitpos);
                let child = &children[index];

                match Self::remove(child, hash, shift + BITS_PER_LEVEL) {
                    Some(new_child) if ReferenceCounter::ptr_eq(&new_child, child) => {
                        Some(this.clone())
                    }
                    Some(new_child) => {
                        if children.len() == 1 && new_child.is_leaf() {
                            return Some(new_child);
                        }
                        let mut new_children = children.to_vec();
                        new_children[index] = new_child;
                        Some(Self::branch(*bitmap, new_children))
                    }
                    None => {
                        let remaining_bitmap = bitmap.without(bitpos);
                        if remaining_bitmap.is_empty() {
                            return None;
                        }

                        let mut remaining = children.to_vec();
                        remaining.remove(index);

                        if remaining.len() == 1 && remaining[0].is_leaf() {
                            return remaining.pop();
                        }
                        Some(Self::branch(remaining_bitmap, remaining))
                    }
                }
            }
        }
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Returns a lazy depth-first iterator over the entries below `this`.
    pub(crate) fn entries(this: &NodeRef<K, V>) -> Entries<'_, K, V> {
        Entries {
            stack: vec![slice::from_ref(this).iter()],
        }
    }
}

/// Depth-first iterator over the entries of a trie, in bit-rank order.
pub(crate) struct Entries<'a, K, V> {
    stack: Vec<slice::Iter<'a, NodeRef<K, V>>>,
}

impl<K, V> Entries<'_, K, V> {
    /// An iterator over nothing, for the empty trie.
    pub(crate) const fn empty() -> Self {
        Self { stack: Vec::new() }
    }
}

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(node) => match node.as_ref() {
                    Node::Leaf { key, value, .. } => return Some((key, value)),
                    Node::Branch { children, .. } => self.stack.push(children.iter()),
                },
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rstest::rstest;

    /// Checks the structural invariants of a trie and returns its leaf count.
    pub(crate) fn assert_invariants<K, V>(node: &Node<K, V>, shift: u32) -> usize {
        match node {
            Node::Leaf { .. } => 1,
            Node::Branch { bitmap, children } => {
                assert!(!children.is_empty(), "branch without children");
                assert_eq!(
                    bitmap.count(),
                    children.len(),
                    "bitmap and children disagree"
                );
                if children.len() == 1 {
                    assert!(!children[0].is_leaf(), "single leaf left under a branch");
                }
                let mut bits = bitmap.bits();
                let mut total = 0;
                for child in children {
                    let slot = bits.trailing_zeros();
                    bits &= bits - 1;
                    if let Node::Leaf { hash, .. } = child.as_ref() {
                        assert_eq!(Bitmap::digit(*hash, shift), slot, "leaf in the wrong slot");
                    }
                    total += assert_invariants(child, shift + BITS_PER_LEVEL);
                }
                total
            }
        }
    }

    fn build(hashes: &[u32]) -> Option<NodeRef<u32, u32>> {
        let mut root: Option<NodeRef<u32, u32>> = None;
        for &hash in hashes {
            root = Some(match root {
                None => Node::leaf(hash, hash, hash.wrapping_mul(10)),
                Some(node) => Node::add(&node, hash, 0, hash, hash.wrapping_mul(10)).0,
            });
        }
        root
    }

    #[rstest]
    fn test_leaf_lookup_compares_full_hash() {
        let leaf = Node::leaf(0b1_00001, "key", 1);
        assert_eq!(leaf.get(0b1_00001, 0), Some(&1));
        assert_eq!(leaf.get(0b0_00001, 0), None);
        assert!(leaf.contains(0b1_00001, 5));
        assert!(!leaf.contains(0b10_00001, 5));
    }

    #[rstest]
    fn test_leaf_add_same_hash_replaces() {
        let leaf = Node::leaf(7, "first", 1);
        let (replaced, added) = Node::add(&leaf, 7, 0, "second", 2);
        assert!(!added);
        assert_eq!(replaced.get_entry(7, 0), Some((&"second", &2)));
        assert_eq!(leaf.get_entry(7, 0), Some((&"first", &1)));
    }

    #[rstest]
    fn test_leaf_add_different_digit_splits_into_branch() {
        let leaf = Node::leaf(3, 3, "three");
        let (node, added) = Node::add(&leaf, 1, 0, 1, "one");
        assert!(added);
        match node.as_ref() {
            Node::Branch { bitmap, children } => {
                assert_eq!(bitmap.bits(), (1 << 1) | (1 << 3));
                assert_eq!(children.len(), 2);
                assert!(ReferenceCounter::ptr_eq(&children[1], &leaf));
            }
            Node::Leaf { .. } => panic!("expected a branch"),
        }
        assert_eq!(node.to_array(), vec![(&1, &"one"), (&3, &"three")]);
    }

    #[rstest]
    fn test_split_builds_chain_while_digits_agree() {
        let first = 0b00010_00000_00001;
        let second = 0b00011_00000_00001;
        let root = build(&[first, second]).unwrap();

        assert_eq!(root.depth(), 4);
        assert_eq!(root.get(first, 0), Some(&(first * 10)));
        assert_eq!(root.get(second, 0), Some(&(second * 10)));
        assert_eq!(assert_invariants(&root, 0), 2);
    }

    #[rstest]
    fn test_split_uses_top_two_bits() {
        let low = 0x3FFF_FFFF;
        let high = 0xFFFF_FFFF;
        let root = build(&[low, high]).unwrap();

        assert_eq!(root.depth(), 8);
        assert_eq!(root.get(low, 0), Some(&(low.wrapping_mul(10))));
        assert_eq!(root.get(high, 0), Some(&(high.wrapping_mul(10))));
        assert_eq!(assert_invariants(&root, 0), 2);
    }

    #[rstest]
    fn test_branch_add_shares_untouched_children() {
        let root = build(&[1, 2, 33]).unwrap();
        let (extended, added) = Node::add(&root, 4, 0, 4, 40);
        assert!(added);

        match (root.as_ref(), extended.as_ref()) {
            (
                Node::Branch {
                    children: before, ..
                },
                Node::Branch {
                    children: after, ..
                },
            ) => {
                assert!(ReferenceCounter::ptr_eq(&before[0], &after[0]));
                assert!(ReferenceCounter::ptr_eq(&before[1], &after[1]));
            }
            _ => panic!("expected branches"),
        }
        assert_eq!(assert_invariants(&root, 0), 3);
        assert_eq!(assert_invariants(&extended, 0), 4);
    }

    #[rstest]
    fn test_remove_absent_returns_same_handle() {
        let root = build(&[1, 2, 3]).unwrap();
        let unchanged = Node::remove(&root, 99, 0).unwrap();
        assert!(ReferenceCounter::ptr_eq(&root, &unchanged));

        let other_slot_same_digit = Node::remove(&root, 1 | (1 << 5), 0).unwrap();
        assert!(ReferenceCounter::ptr_eq(&root, &other_slot_same_digit));
    }

    #[rstest]
    fn test_remove_last_leaf_returns_none() {
        let leaf = Node::leaf(5, 5, 50);
        assert!(Node::remove(&leaf, 5, 0).is_none());
    }

    #[rstest]
    fn test_remove_collapses_chain_to_leaf() {
        let first = 0b00010_00000_00001;
        let second = 0b00011_00000_00001;
        let root = build(&[first, second]).unwrap();

        let remaining = Node::remove(&root, second, 0).unwrap();
        assert!(remaining.is_leaf());
        assert_eq!(remaining.depth(), 1);
        assert_eq!(remaining.get(first, 0), Some(&(first * 10)));
    }

    #[rstest]
    fn test_remove_everything_leaves_nothing() {
        let hashes: Vec<u32> = (0..200).map(|index| index * 37 + (index << 11)).collect();
        let mut root = build(&hashes);
        for &hash in &hashes {
            let node = root.expect("trie emptied too early");
            root = Node::remove(&node, hash, 0);
            if let Some(node) = &root {
                assert_invariants(node, 0);
            }
        }
        assert!(root.is_none());
    }

    #[rstest]
    fn test_find_scans_every_child() {
        let root = build(&[1, 2, 3, 64, 1 << 20]).unwrap();
        let mut predicate = |key: &u32, _: &u32| *key == 1 << 20;
        assert_eq!(
            root.find(&mut predicate),
            Some((&(1 << 20), &((1 << 20) * 10)))
        );
        assert!(root.exists(&mut |_: &u32, value: &u32| *value == 640));
        assert!(!root.exists(&mut |_: &u32, value: &u32| *value == 7));
    }

    #[rstest]
    fn test_entries_match_to_array() {
        let root = build(&[9, 41, 73, 2, 1 << 30]).unwrap();
        let lazy: Vec<_> = Node::entries(&root).collect();
        assert_eq!(lazy, root.to_array());
        assert_eq!(lazy.len(), 5);
    }

    #[rstest]
    fn test_map_values_keeps_shape() {
        let root = build(&[1, 33, 65, 7]).unwrap();
        let mapped = root.map_values(&mut |_, value| value + 1);
        assert_eq!(mapped.depth(), root.depth());
        assert_eq!(mapped.get(33, 0), Some(&331));
        assert_eq!(assert_invariants(&mapped, 0), 4);
    }
}
