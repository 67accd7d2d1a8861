use std::iter::FusedIterator;

use super::{visit_stack::VisitStack, Node};

/// In-order iterator on `(depth, &K)` pairs, created by [`BTree::traverse`](super::BTree::traverse).
///
/// Keys come out in ascending order. The depth is the level of the node holding the key,
/// 0 for the root, so a caller can render the tree shape without touching nodes.
pub struct Traverse<'a, K> {
    stack: VisitStack<'a, K>,
    len: usize,
}

impl<'a, K> Traverse<'a, K> {
    pub(crate) fn new(root: Option<&'a Node<K>>, len: usize) -> Self {
        Self {
            stack: VisitStack::new(root),
            len,
        }
    }
}

impl<K> Clone for Traverse<'_, K> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            len: self.len,
        }
    }
}

impl<'a, K> Iterator for Traverse<'a, K> {
    type Item = (usize, &'a K);

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let item = self.stack.next_key()?;
        self.len -= 1;
        Some(item)
    }
}

impl<K> ExactSizeIterator for Traverse<'_, K> {}

impl<K> FusedIterator for Traverse<'_, K> {}

/// A borrowed iterator on keys in ascending order
pub struct Iter<'a, K> {
    inner: Traverse<'a, K>,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(inner: Traverse<'a, K>) -> Self {
        Self { inner }
    }
}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_depth, k)| k)
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}
