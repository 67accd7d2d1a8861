use super::{BTree, Capacity, Node, Statistic};
use std::borrow::Borrow;
use tracing::{debug, trace};

/// Outcome of [`BTree::remove`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum RemoveResult<K> {
    /// One occurrence of the key was removed and is handed back
    Removed(K),
    /// The tree holds no key equal to the one asked for, nothing changed
    NotFound,
    /// The tree is empty, nothing changed
    EmptyTree,
}

impl<K> RemoveResult<K> {
    pub fn is_removed(&self) -> bool {
        matches!(self, RemoveResult::Removed(_))
    }

    /// Returns the removed key, if any
    pub fn removed(self) -> Option<K> {
        match self {
            RemoveResult::Removed(k) => Some(k),
            RemoveResult::NotFound | RemoveResult::EmptyTree => None,
        }
    }
}

impl<K: Ord> BTree<K> {
    /// Remove one key equal to `k`.
    ///
    /// # Examples
    /// ```rust
    /// use mway_btree::{BTree, RemoveResult};
    ///
    /// let mut tree = BTree::with_min_degree(2).unwrap();
    /// assert_eq!(tree.remove(&1), RemoveResult::EmptyTree);
    ///
    /// tree.extend([1, 1, 2]);
    /// assert_eq!(tree.remove(&1), RemoveResult::Removed(1));
    /// assert_eq!(tree.remove(&1), RemoveResult::Removed(1));
    /// assert_eq!(tree.remove(&1), RemoveResult::NotFound);
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn remove<Q>(&mut self, k: &Q) -> RemoveResult<K>
    where
        Q: ?Sized + Ord,
        K: Borrow<Q>,
    {
        let cap = self.capacity;
        let Some(root) = self.root.as_deref_mut() else {
            debug!("remove on empty tree");
            return RemoveResult::EmptyTree;
        };

        let removed = Self::remove_descend(root, k, cap, &mut self.st);
        if removed.is_some() {
            self.len -= 1;
        }
        // a merge right under the root may have taken the root's last key
        self.collapse_root();

        #[cfg(test)]
        self.validate();

        match removed {
            Some(k) => RemoveResult::Removed(k),
            None => {
                debug!(len = self.len, "remove: key not found");
                RemoveResult::NotFound
            }
        }
    }

    /// Replace a drained root with its only child until the root holds a key, or drop it
    /// when it was the last leaf.
    ///
    /// With `min_keys == 0` (order 3) a drained inner node may sit right under the root,
    /// so more than one level can go at once. Every descent relies on the root holding a
    /// key, that is what gives each filled child a sibling.
    fn collapse_root(&mut self) {
        loop {
            let root = match self.root.take() {
                Some(root) if root.is_empty() => root,
                root => {
                    self.root = root;
                    return;
                }
            };

            self.st.nodes_freed += 1;
            self.root = root.into_only_child();

            if self.root.is_some() {
                self.st.root_collapse += 1;
                trace!("root drained, tree shrinks");
            } else {
                trace!("last key removed, tree is empty");
            }
        }
    }

    /// Remove `k` from the subtree at `node`. The caller guarantees `node` holds more than
    /// the minimum number of keys (or is the root), so a key can be taken without refilling
    /// `node` itself.
    fn remove_descend<Q>(
        node: &mut Node<K>,
        k: &Q,
        cap: Capacity,
        st: &mut Statistic,
    ) -> Option<K>
    where
        Q: ?Sized + Ord,
        K: Borrow<Q>,
    {
        match node.locate(k) {
            Ok(idx) if node.is_leaf() => Some(node.remove_key(idx)),
            Ok(idx) => Some(Self::remove_separator(node, idx, cap, st)),
            Err(_) if node.is_leaf() => None,
            Err(child_idx) => {
                let child_idx = if node.child(child_idx).able_to_lend(cap) {
                    child_idx
                } else {
                    Self::fill(node, child_idx, cap, st)
                };
                Self::remove_descend(node.child_mut(child_idx), k, cap, st)
            }
        }
    }

    /// Remove the key at `idx` of an internal node, substituting the predecessor or the
    /// successor when a neighbouring child can spare one, merging otherwise.
    fn remove_separator(node: &mut Node<K>, idx: usize, cap: Capacity, st: &mut Statistic) -> K {
        if node.child(idx).able_to_lend(cap) {
            let predecessor = Self::pop_last(node.child_mut(idx), cap, st);
            return node.set_key(idx, predecessor);
        }

        if node.child(idx + 1).able_to_lend(cap) {
            let successor = Self::pop_first(node.child_mut(idx + 1), cap, st);
            return node.set_key(idx, successor);
        }

        // the separator lands right after the left child's keys
        let offset = node.child(idx).len();
        Self::merge(node, idx, st);
        st.merge_separator += 1;

        let merged = node.child_mut(idx);
        if merged.is_leaf() {
            merged.remove_key(offset)
        } else {
            Self::remove_separator(merged, offset, cap, st)
        }
    }

    /// Remove and return the largest key of the subtree at `node`
    fn pop_last(node: &mut Node<K>, cap: Capacity, st: &mut Statistic) -> K {
        if node.is_leaf() {
            return node.remove_key(node.len() - 1);
        }

        let mut child_idx = node.len();
        if !node.child(child_idx).able_to_lend(cap) {
            child_idx = Self::fill(node, child_idx, cap, st);
        }
        Self::pop_last(node.child_mut(child_idx), cap, st)
    }

    /// Remove and return the smallest key of the subtree at `node`
    fn pop_first(node: &mut Node<K>, cap: Capacity, st: &mut Statistic) -> K {
        if node.is_leaf() {
            return node.remove_key(0);
        }

        if !node.child(0).able_to_lend(cap) {
            // the first child has no left sibling, so it stays at 0 even when merged
            let _ = Self::fill(node, 0, cap, st);
        }
        Self::pop_first(node.child_mut(0), cap, st)
    }

    /// Bring the child at `child_idx` above the minimum before descending into it.
    /// Returns the index the child ends up at, it moves left by one when merged into its
    /// left sibling.
    fn fill(node: &mut Node<K>, child_idx: usize, cap: Capacity, st: &mut Statistic) -> usize {
        let prev_sibling = if child_idx > 0 {
            Some(node.child(child_idx - 1))
        } else {
            None
        };
        let next_sibling = if child_idx < node.len() {
            Some(node.child(child_idx + 1))
        } else {
            None
        };

        let action = match (prev_sibling, next_sibling) {
            (Some(p), _) if p.able_to_lend(cap) => FixAction::RotateRight,
            (_, Some(n)) if n.able_to_lend(cap) => FixAction::RotateLeft,
            (_, Some(_)) => FixAction::MergeRight,
            (Some(_), None) => FixAction::MergeLeft,
            // the parent always holds a key, see `collapse_root`
            (None, None) => unreachable!("filled child without a sibling"),
        };

        match action {
            FixAction::RotateRight => {
                node.rotate_right(child_idx - 1);
                st.rotate_right += 1;
                trace!(child_idx, "borrow from left sibling");
                child_idx
            }
            FixAction::RotateLeft => {
                node.rotate_left(child_idx);
                st.rotate_left += 1;
                trace!(child_idx, "borrow from right sibling");
                child_idx
            }
            FixAction::MergeRight => {
                Self::merge(node, child_idx, st);
                st.merge_with_right += 1;
                child_idx
            }
            FixAction::MergeLeft => {
                Self::merge(node, child_idx - 1, st);
                st.merge_with_left += 1;
                child_idx - 1
            }
        }
    }

    fn merge(node: &mut Node<K>, slot: usize, st: &mut Statistic) {
        node.merge_children(slot);
        st.nodes_freed += 1;
        trace!(slot, parent_len = node.len(), "merge children");
    }
}

/// Fix action
#[derive(Debug)]
enum FixAction {
    /// take the last key of the left sibling
    RotateRight,
    /// take the first key of the right sibling
    RotateLeft,
    MergeLeft,
    MergeRight,
}
