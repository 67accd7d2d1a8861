use std::fmt;

use super::{BTree, Node};

/// What a [`DescendVisit`] wants to do after looking at an inner node
pub enum DescendVisitResult<R> {
    /// Step into the child at this index, `0..=keys.len()`
    GoDown(usize),
    /// Stop, the walk returns `None`
    Cancel,
    /// Stop with an answer taken from the inner node, the leaf is never reached
    Complete(R),
}

/// Visitor for a single root to leaf walk.
///
/// Every inner node shows its keys and the visitor names one child to step into, so a
/// visit touches one node per level. Search-like probes (path sums, depth) fit here.
pub trait DescendVisit<K> {
    type Result;

    /// `keys` of an inner node, it has `keys.len() + 1` children to choose from
    fn visit_inner(&mut self, keys: &[K]) -> DescendVisitResult<Self::Result>;
    fn visit_leaf(&mut self, keys: &[K]) -> Option<Self::Result>;
}

impl<K: Ord> BTree<K> {
    /// Walk a single root to leaf path, `v` picks the child at every inner node.
    /// Returns `None` on an empty tree.
    pub fn descend_visit<V>(&self, mut v: V) -> Option<V::Result>
    where
        V: DescendVisit<K>,
    {
        let mut node = self.root.as_deref()?;
        loop {
            if node.is_leaf() {
                return v.visit_leaf(node.keys());
            }

            match v.visit_inner(node.keys()) {
                DescendVisitResult::GoDown(child_idx) => {
                    assert!(child_idx <= node.len(), "invalid child index");
                    node = node.child(child_idx);
                }
                DescendVisitResult::Cancel => {
                    return None;
                }
                DescendVisitResult::Complete(r) => {
                    return Some(r);
                }
            }
        }
    }
}

/// A borrowed handle to the node a search stopped at
pub struct NodeRef<'a, K> {
    node: &'a Node<K>,
    offset: usize,
}

impl<K> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeRef<'_, K> {}

impl<'a, K> NodeRef<'a, K> {
    pub(crate) fn new(node: &'a Node<K>, offset: usize) -> Self {
        debug_assert!(offset < node.len());
        Self { node, offset }
    }

    /// The matched key
    pub fn key(&self) -> &'a K {
        self.node.key(self.offset)
    }

    /// Offset of the matched key inside the node
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// All keys of the node, in order
    pub fn keys(&self) -> &'a [K] {
        self.node.keys()
    }

    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    /// Number of children, 0 for a leaf
    pub fn child_count(&self) -> usize {
        self.node.children().len()
    }
}

impl<K: fmt::Debug> fmt::Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("keys", &self.keys())
            .field("offset", &self.offset)
            .field("is_leaf", &self.is_leaf())
            .finish()
    }
}
