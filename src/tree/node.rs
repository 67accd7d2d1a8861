use std::{borrow::Borrow, fmt, mem};

use super::Capacity;

/// Tree node, it contains a sorted list of keys and, for internal nodes, the owned children.
///
/// An internal node with `n` keys has exactly `n + 1` children, child `i` holds the keys
/// between `keys[i - 1]` and `keys[i]`. A node is a leaf iff it has no children.
#[derive(Clone)]
pub(crate) struct Node<K> {
    keys: Vec<K>,
    children: Vec<Box<Node<K>>>,
}

impl<K> Node<K> {
    /// Create an empty leaf node
    pub(crate) fn new_leaf() -> Box<Self> {
        Box::new(Self {
            keys: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Create an empty root above `child`, the caller is expected to split the child
    /// right after so the new root gets its first key.
    pub(crate) fn new_root(child: Box<Self>) -> Box<Self> {
        Box::new(Self {
            keys: Vec::new(),
            children: vec![child],
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(keys: Vec<K>, children: Vec<Box<Self>>) -> Box<Self> {
        assert!(children.is_empty() || children.len() == keys.len() + 1);
        Box::new(Self { keys, children })
    }

    /// Number of keys in this node
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// whether this node is full, if yes, it must be split before an insert walks into it
    pub(crate) fn is_full(&self, cap: Capacity) -> bool {
        self.len() >= cap.max_keys()
    }

    /// whether this node is able to lend a key to its sibling
    pub(crate) fn able_to_lend(&self, cap: Capacity) -> bool {
        self.len() > cap.min_keys()
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn key(&self, idx: usize) -> &K {
        &self.keys[idx]
    }

    pub(crate) fn children(&self) -> &[Box<Node<K>>] {
        &self.children
    }

    #[inline]
    pub(crate) fn child(&self, idx: usize) -> &Node<K> {
        &self.children[idx]
    }

    #[inline]
    pub(crate) fn child_mut(&mut self, idx: usize) -> &mut Node<K> {
        &mut self.children[idx]
    }

    /// Insert `key` at `idx`, only valid for leaf nodes.
    pub(crate) fn insert_key(&mut self, idx: usize, key: K) {
        debug_assert!(self.is_leaf());
        self.keys.insert(idx, key);
    }

    /// Remove the key at `idx`, only valid for leaf nodes.
    pub(crate) fn remove_key(&mut self, idx: usize) -> K {
        debug_assert!(self.is_leaf());
        self.keys.remove(idx)
    }

    /// Update the key at `idx`, returns the previous key.
    pub(crate) fn set_key(&mut self, idx: usize, key: K) -> K {
        mem::replace(&mut self.keys[idx], key)
    }

    /// Consume a drained root and return its only child, `None` if the root was a leaf.
    pub(crate) fn into_only_child(self: Box<Self>) -> Option<Box<Self>> {
        let Node { keys, mut children } = *self;
        debug_assert!(keys.is_empty());
        debug_assert!(children.len() <= 1);
        children.pop()
    }

    /// Split the full child at `idx`. The child keeps the keys below the split index, the
    /// key at the split index moves up into this node at `idx`, and a new sibling at
    /// `idx + 1` takes the rest along with the matching children.
    pub(crate) fn split_child(&mut self, idx: usize, cap: Capacity) {
        let mid = cap.split_index();
        let child = &mut self.children[idx];
        debug_assert!(child.is_full(cap));

        let mut right_keys = child.keys.split_off(mid);
        let median = right_keys.remove(0);
        let right_children = if child.is_leaf() {
            Vec::new()
        } else {
            child.children.split_off(mid + 1)
        };

        self.keys.insert(idx, median);
        self.children.insert(
            idx + 1,
            Box::new(Node {
                keys: right_keys,
                children: right_children,
            }),
        );
    }

    /// Locate `k` in this node.
    /// `Ok(idx)` is the first key equal to `k`, `Err(idx)` is the child to descend into.
    pub(crate) fn locate<Q>(&self, k: &Q) -> Result<usize, usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let idx = self.keys.partition_point(|key| key.borrow() < k);
        match self.keys.get(idx) {
            Some(key) if key.borrow() == k => Ok(idx),
            _ => Err(idx),
        }
    }

    /// Smallest key of this subtree. Order 3 trees may hold empty nodes, so an empty
    /// leftmost leaf falls back to the keys above it.
    pub(crate) fn first_key(&self) -> Option<&K> {
        match self.children.first() {
            Some(child) => child.first_key().or_else(|| self.keys.first()),
            None => self.keys.first(),
        }
    }

    /// Largest key of this subtree
    pub(crate) fn last_key(&self) -> Option<&K> {
        match self.children.last() {
            Some(child) => child.last_key().or_else(|| self.keys.last()),
            None => self.keys.last(),
        }
    }

    /// Slot for inserting `k`, after any equal keys already in this node.
    pub(crate) fn insert_slot(&self, k: &K) -> usize
    where
        K: Ord,
    {
        self.keys.partition_point(|key| key <= k)
    }

    fn pop(&mut self) -> (K, Option<Box<Node<K>>>) {
        let k = self.keys.remove(self.keys.len() - 1);
        (k, self.children.pop())
    }

    fn pop_front(&mut self) -> (K, Option<Box<Node<K>>>) {
        let k = self.keys.remove(0);
        let c = if self.is_leaf() {
            None
        } else {
            Some(self.children.remove(0))
        };
        (k, c)
    }

    fn push(&mut self, k: K, c: Option<Box<Node<K>>>) {
        self.keys.push(k);
        self.children.extend(c);
    }

    fn push_front(&mut self, k: K, c: Option<Box<Node<K>>>) {
        self.keys.insert(0, k);
        if let Some(c) = c {
            self.children.insert(0, c);
        }
    }

    /// The child at `slot` lends its last key (and last child) to the child at `slot + 1`,
    /// passing through the separator at `slot`.
    pub(crate) fn rotate_right(&mut self, slot: usize) {
        //     1    3  5
        //      ..2  4
        // rotate right
        //     1    2   5
        //       ..   3,4
        let (k, c) = self.children[slot].pop();
        let slot_key = self.set_key(slot, k);
        self.children[slot + 1].push_front(slot_key, c);
    }

    /// The child at `slot + 1` lends its first key (and first child) to the child at
    /// `slot`, passing through the separator at `slot`.
    pub(crate) fn rotate_left(&mut self, slot: usize) {
        //     1  3  5
        //       2  4..
        // rotate left
        //     1   4   5
        //      2,3  ..
        let (k, c) = self.children[slot + 1].pop_front();
        let slot_key = self.set_key(slot, k);
        self.children[slot].push(slot_key, c);
    }

    /// Merge the child at `slot + 1` and the separator at `slot` into the child at `slot`.
    /// The absorbed child is dropped.
    pub(crate) fn merge_children(&mut self, slot: usize) {
        //     1  3  5
        //       2  4
        //  merge 3
        //     1        5
        //       2,3,4
        debug_assert!(slot < self.len());

        let slot_key = self.keys.remove(slot);
        let right = self.children.remove(slot + 1);
        self.children[slot].merge_next(slot_key, right);
    }

    fn merge_next(&mut self, slot_key: K, right: Box<Node<K>>) {
        let Node { keys, children } = *right;
        debug_assert_eq!(self.is_leaf(), children.is_empty());

        self.keys.push(slot_key);
        self.keys.extend(keys);
        self.children.extend(children);
    }

    /// Write this subtree one node per line, indented four spaces per level
    pub(crate) fn fmt_levels(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result
    where
        K: fmt::Display,
    {
        write!(f, "{:indent$}", "", indent = level * 4)?;
        for k in self.keys.iter() {
            write!(f, "{k} ")?;
        }
        writeln!(f)?;

        for child in self.children.iter() {
            child.fmt_levels(f, level + 1)?;
        }
        Ok(())
    }
}
