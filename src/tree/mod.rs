mod capacity;
pub use capacity::*;
mod node;
use node::Node;
mod iterator;
pub use iterator::*;
mod tree_remove;
pub use tree_remove::RemoveResult;
pub mod visit;
pub use visit::NodeRef;

mod visit_stack;

use std::{borrow::Borrow, fmt};

use tracing::trace;

use crate::error::Result;

/// m-way B-tree, with following considerations:
///
/// 1. One rebalancing core for both the order `m` and the minimum degree `t` flavour, the
///    caller picks the flavour with [`Branching`] and the bounds are derived at runtime
/// 2. Single pass mutation, insert splits full nodes on the way down, remove fills
///    undersized nodes on the way down, so no operation ever walks back up
/// 3. Plain exclusive ownership, each node owns its children and nothing else points at them
///
/// Duplicate keys are allowed, an equal key is placed after the ones already stored.
///
/// # Example
/// ```rust
/// use mway_btree::{BTree, Branching, RemoveResult};
///
/// let mut tree = BTree::new(Branching::MinDegree(2)).unwrap();
///
/// for k in [10, 20, 5, 6, 12, 30, 7, 17] {
///     tree.insert(k);
/// }
///
/// assert!(tree.search(&12).is_some());
/// assert_eq!(tree.remove(&6), RemoveResult::Removed(6));
/// assert_eq!(tree.remove(&6), RemoveResult::NotFound);
///
/// let keys = tree.iter().copied().collect::<Vec<_>>();
/// assert_eq!(keys, vec![5, 7, 10, 12, 17, 20, 30]);
/// ```
///
/// # Example
/// Traverse with depth
///
/// ``` rust
/// use mway_btree::BTree;
///
/// let mut tree = BTree::with_order(4).unwrap();
/// tree.extend(1..=3);
/// // the root is full, the next insert grows the tree
/// tree.insert(4);
///
/// let layout = tree.traverse().collect::<Vec<_>>();
/// assert_eq!(layout, vec![(1, &1), (0, &2), (1, &3), (1, &4)]);
/// assert_eq!(tree.height(), 2);
/// ```
#[derive(Clone)]
pub struct BTree<K> {
    root: Option<Box<Node<K>>>,
    len: usize,
    branching: Branching,
    capacity: Capacity,
    st: Statistic,
}

impl<K: Ord> BTree<K> {
    /// Create an empty tree, fails if the branching parameter is out of range.
    pub fn new(branching: Branching) -> Result<Self> {
        let capacity = branching.capacity()?;
        Ok(Self {
            root: None,
            len: 0,
            branching,
            capacity,
            st: Statistic::default(),
        })
    }

    /// Create an empty tree of order `m`, each node holds at most `m - 1` keys.
    pub fn with_order(m: usize) -> Result<Self> {
        Self::new(Branching::Order(m))
    }

    /// Create an empty tree of minimum degree `t`, each node holds at most `2t - 1` keys.
    pub fn with_min_degree(t: usize) -> Result<Self> {
        Self::new(Branching::MinDegree(t))
    }

    /// Returns the number of keys in the tree, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The branching parameter this tree was created with
    pub fn branching(&self) -> Branching {
        self.branching
    }

    /// Node bounds derived from the branching parameter
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn statistic(&self) -> &Statistic {
        &self.st
    }

    /// Number of levels, 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut node = match self.root.as_deref() {
            Some(root) => root,
            None => return 0,
        };

        let mut height = 1;
        while !node.is_leaf() {
            node = node.child(0);
            height += 1;
        }
        height
    }

    /// Insert a key into the tree.
    pub fn insert(&mut self, key: K) {
        let cap = self.capacity;

        let root = match self.root.take() {
            None => {
                self.st.nodes_allocated += 1;
                Node::new_leaf()
            }
            Some(root) if root.is_full(cap) => {
                let mut new_root = Node::new_root(root);
                new_root.split_child(0, cap);

                self.st.root_grow += 1;
                self.st.split += 1;
                self.st.nodes_allocated += 2;
                trace!(max_keys = cap.max_keys(), "root split, tree grows");

                new_root
            }
            Some(root) => root,
        };

        let root = self.root.insert(root);
        Self::insert_non_full(root, key, cap, &mut self.st);
        self.len += 1;

        #[cfg(test)]
        self.validate();
    }

    /// Walk down from a node known not to be full, splitting every full child before
    /// stepping into it, and place `key` in the leaf.
    fn insert_non_full(mut node: &mut Node<K>, key: K, cap: Capacity, st: &mut Statistic) {
        loop {
            let mut idx = node.insert_slot(&key);

            if node.is_leaf() {
                node.insert_key(idx, key);
                return;
            }

            if node.child(idx).is_full(cap) {
                node.split_child(idx, cap);
                st.split += 1;
                st.nodes_allocated += 1;
                trace!(child_idx = idx, "split full child");

                // the promoted key now sits at idx, equal keys go after it
                if *node.key(idx) <= key {
                    idx += 1;
                }
            }

            node = node.child_mut(idx);
        }
    }

    /// Find the node holding `k`.
    /// Returns a handle to that node positioned at the first equal key.
    pub fn search<Q>(&self, k: &Q) -> Option<NodeRef<'_, K>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut node = self.root.as_deref()?;
        loop {
            match node.locate(k) {
                Ok(offset) => return Some(NodeRef::new(node, offset)),
                Err(_) if node.is_leaf() => return None,
                Err(child_idx) => node = node.child(child_idx),
            }
        }
    }

    /// Returns true if the tree holds at least one key equal to `k`.
    pub fn contains<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(k).is_some()
    }

    /// Returns the smallest key.
    pub fn first(&self) -> Option<&K> {
        self.root.as_deref()?.first_key()
    }

    /// Returns the largest key.
    pub fn last(&self) -> Option<&K> {
        self.root.as_deref()?.last_key()
    }

    /// Clear the tree, statistics start over as well
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
        self.st = Statistic::default();
    }

    /// Create an in-order iterator on `(depth, &K)` pairs, the root is at depth 0.
    pub fn traverse(&self) -> Traverse<'_, K> {
        Traverse::new(self.root.as_deref(), self.len)
    }

    /// Create an in-order iterator on keys
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self.traverse())
    }

    #[cfg(test)]
    pub(crate) fn validate(&self) {
        let Some(root) = self.root.as_deref() else {
            assert_eq!(self.len, 0);
            return;
        };

        assert!(!root.is_empty(), "root is left drained");

        let mut leaf_depth = None;
        let count = self.validate_node(root, 0, None, None, &mut leaf_depth);
        assert_eq!(count, self.len);
        assert_eq!(leaf_depth.map(|d| d + 1), Some(self.height()));
    }

    #[cfg(test)]
    fn validate_node(
        &self,
        node: &Node<K>,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        leaf_depth: &mut Option<usize>,
    ) -> usize {
        let cap = self.capacity;
        assert!(node.len() <= cap.max_keys(), "node over capacity");
        if depth > 0 {
            assert!(node.len() >= cap.min_keys(), "node under minimum");
        }

        let keys = node.keys();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]), "keys out of order");
        if let (Some(lower), Some(first)) = (lower, keys.first()) {
            assert!(lower <= first);
        }
        if let (Some(upper), Some(last)) = (upper, keys.last()) {
            assert!(last <= upper);
        }

        if node.is_leaf() {
            match leaf_depth {
                Some(d) => assert_eq!(*d, depth, "leaves at different depth"),
                None => *leaf_depth = Some(depth),
            }
            return node.len();
        }

        assert_eq!(node.children().len(), node.len() + 1);
        let mut count = node.len();
        for (idx, child) in node.children().iter().enumerate() {
            let lower = if idx == 0 { lower } else { Some(node.key(idx - 1)) };
            let upper = if idx == node.len() { upper } else { Some(node.key(idx)) };
            count += self.validate_node(child, depth + 1, lower, upper, leaf_depth);
        }
        count
    }

    #[cfg(test)]
    fn node_count(&self) -> usize {
        fn count<K>(node: &Node<K>) -> usize {
            1 + node.children().iter().map(|c| count(c)).sum::<usize>()
        }
        self.root.as_deref().map(count).unwrap_or_default()
    }
}

impl<K: Ord> Extend<K> for BTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            self.insert(k);
        }
    }
}

impl<'a, K: Ord> IntoIterator for &'a BTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for BTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BTree")
            .field("branching", &self.branching)
            .field("len", &self.len)
            .field("keys", &DebugKeys(self))
            .finish()
    }
}

struct DebugKeys<'a, K>(&'a BTree<K>);

impl<K: Ord + fmt::Debug> fmt::Debug for DebugKeys<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Renders one node per line, indented four spaces per level, root first.
///
/// ```rust
/// use mway_btree::BTree;
///
/// let mut tree = BTree::with_min_degree(2).unwrap();
/// tree.extend([1, 2, 3, 4]);
/// assert_eq!(tree.to_string(), "2 \n    1 \n    3 4 \n");
/// ```
impl<K: fmt::Display> fmt::Display for BTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root.as_deref() {
            Some(root) => root.fmt_levels(f, 0),
            None => Ok(()),
        }
    }
}

/// Statistic data, counts the structural changes done by the tree
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Statistic {
    pub split: u64,
    pub root_grow: u64,
    pub root_collapse: u64,

    /// borrowed a key from the left sibling
    pub rotate_right: u64,
    /// borrowed a key from the right sibling
    pub rotate_left: u64,

    pub merge_with_left: u64,
    pub merge_with_right: u64,
    /// merged the two children around a removed separator
    pub merge_separator: u64,

    pub nodes_allocated: u64,
    pub nodes_freed: u64,
}

impl Statistic {
    /// Nodes currently owned by the tree
    pub fn live_nodes(&self) -> u64 {
        self.nodes_allocated - self.nodes_freed
    }
}

/// ensure BTree is send and sync for send and sync K
fn _ensure_send_sync<K: Send + Sync>() {
    fn _assert_send_sync<T: Send + Sync>() {}
    _assert_send_sync::<BTree<K>>();
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, collections::BTreeMap, rc::Rc};

    use proptest::prelude::*;
    use rand::seq::SliceRandom;

    use super::*;
    use crate::Error;

    const BRANCHINGS: [Branching; 6] = [
        Branching::Order(3),
        Branching::Order(4),
        Branching::Order(5),
        Branching::MinDegree(2),
        Branching::MinDegree(3),
        Branching::MinDegree(32),
    ];

    #[test]
    fn test_round_trip() {
        for branching in BRANCHINGS {
            round_trip_one(branching, 3000);
        }
    }

    fn round_trip_one(branching: Branching, size: i64) {
        let mut tree = BTree::new(branching).unwrap();

        let mut keys = (0..size).collect::<Vec<_>>();
        keys.shuffle(&mut rand::thread_rng());

        for i in keys {
            tree.insert(i);
            assert!(tree.contains(&i));
        }
        assert_eq!(tree.len(), size as usize);

        let mut keys = (0..size).collect::<Vec<_>>();
        keys.shuffle(&mut rand::thread_rng());
        for i in keys.iter() {
            assert_eq!(tree.search(i).unwrap().key(), i);
        }

        for i in keys {
            assert_eq!(tree.remove(&i), RemoveResult::Removed(i));
            assert!(!tree.contains(&i));
            assert_eq!(tree.statistic().live_nodes(), tree.node_count() as u64);
        }

        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.statistic().live_nodes(), 0);
    }

    #[test]
    fn test_degree_two_scenario() {
        let mut tree = BTree::with_min_degree(2).unwrap();
        tree.extend([10, 20, 5, 6, 12, 30, 7, 17]);

        let keys = tree.iter().copied().collect::<Vec<_>>();
        assert_eq!(keys, vec![5, 6, 7, 10, 12, 17, 20, 30]);

        let root = tree.root.as_deref().unwrap();
        assert_eq!(root.keys(), &[10, 20]);
        assert_eq!(root.children().len(), 3);
        assert_eq!(root.child(0).keys(), &[5, 6, 7]);
        assert_eq!(root.child(1).keys(), &[12, 17]);
        assert_eq!(root.child(2).keys(), &[30]);

        // every leaf sits right under the root
        for (depth, k) in tree.traverse() {
            let expected = if [10, 20].contains(k) { 0 } else { 1 };
            assert_eq!(depth, expected);
        }
        assert_eq!(tree.statistic().root_grow, 1);
        assert_eq!(tree.statistic().split, 2);
    }

    #[test]
    fn test_order_four_ascending() {
        let mut tree = BTree::with_order(4).unwrap();
        tree.extend(1..=7);

        let root = tree.root.as_deref().unwrap();
        assert_eq!(root.keys(), &[2, 4]);
        for child in root.children() {
            assert!(child.is_leaf());
            assert!((1..=3).contains(&child.len()));
        }
        assert_eq!(root.child(2).keys(), &[5, 6, 7]);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_remove_merge_shrinks_height() {
        let mut tree = BTree::with_min_degree(2).unwrap();
        tree.extend([1, 2, 3, 4]);
        assert_eq!(tree.remove(&4), RemoveResult::Removed(4));

        // two leaves at minimum occupancy around a single root key
        {
            let root = tree.root.as_deref().unwrap();
            assert_eq!(root.keys(), &[2]);
            assert_eq!(root.child(0).keys(), &[1]);
            assert_eq!(root.child(1).keys(), &[3]);
        }
        assert_eq!(tree.height(), 2);

        assert_eq!(tree.remove(&2), RemoveResult::Removed(2));

        let root = tree.root.as_deref().unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.keys(), &[1, 3]);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.statistic().merge_separator, 1);
        assert_eq!(tree.statistic().root_collapse, 1);
    }

    #[test]
    fn test_remove_absent() {
        let mut tree = BTree::with_order(5).unwrap();
        assert_eq!(tree.remove(&1), RemoveResult::EmptyTree);
        assert!(tree.search(&1).is_none());

        tree.extend((0..100).map(|i| i * 2));
        let before = tree.iter().copied().collect::<Vec<_>>();

        for k in [-1, 1, 51, 199, 1000] {
            assert_eq!(tree.remove(&k), RemoveResult::NotFound);
            assert_eq!(tree.remove(&k), RemoveResult::NotFound);
        }

        let after = tree.iter().copied().collect::<Vec<_>>();
        assert_eq!(before, after);
        assert_eq!(tree.len(), 100);
    }

    #[test]
    fn test_remove_last_key_empties_tree() {
        let mut tree = BTree::with_min_degree(3).unwrap();
        tree.insert("only");
        assert_eq!(tree.remove("only"), RemoveResult::Removed("only"));
        assert!(tree.root.is_none());
        assert_eq!(tree.remove("only"), RemoveResult::EmptyTree);

        // the tree is usable again
        tree.insert("again");
        assert_eq!(tree.first(), Some(&"again"));
    }

    #[test]
    fn test_duplicates() {
        for branching in BRANCHINGS {
            let mut tree = BTree::new(branching).unwrap();
            for i in 0..200 {
                tree.insert(i % 7);
            }
            assert_eq!(tree.len(), 200);

            let keys = tree.iter().copied().collect::<Vec<_>>();
            let mut expected = (0..200).map(|i| i % 7).collect::<Vec<_>>();
            expected.sort();
            assert_eq!(keys, expected);

            // each remove takes exactly one copy
            let copies_of_3 = expected.iter().filter(|k| **k == 3).count();
            for left in (0..copies_of_3).rev() {
                assert_eq!(tree.remove(&3), RemoveResult::Removed(3));
                assert_eq!(tree.iter().filter(|k| **k == 3).count(), left);
            }
            assert_eq!(tree.remove(&3), RemoveResult::NotFound);
            assert_eq!(tree.len(), 200 - copies_of_3);
        }
    }

    #[test]
    fn test_first_last() {
        let mut tree = BTree::with_order(6).unwrap();
        assert_eq!(tree.first(), None);
        assert_eq!(tree.last(), None);

        let mut keys = (0..500).collect::<Vec<_>>();
        keys.shuffle(&mut rand::thread_rng());
        tree.extend(keys);

        assert_eq!(tree.first(), Some(&0));
        assert_eq!(tree.last(), Some(&499));
    }

    #[test]
    fn test_tree_clear() {
        let mut tree = BTree::with_min_degree(2).unwrap();
        tree.extend(0..100);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.statistic(), &Statistic::default());

        // insert after clear
        tree.extend(0..100);
        assert_eq!(tree.len(), 100);
    }

    #[test]
    fn test_invalid_branching() {
        assert_eq!(BTree::<i32>::with_order(2).err(), Some(Error::InvalidOrder(2)));
        assert_eq!(
            BTree::<i32>::with_min_degree(1).err(),
            Some(Error::InvalidMinDegree(1))
        );
        assert!(BTree::<i32>::with_order(3).is_ok());
    }

    #[test]
    fn test_display_levels() {
        let mut tree = BTree::with_min_degree(2).unwrap();
        assert_eq!(tree.to_string(), "");
        tree.extend([10, 20, 5, 6, 12, 30, 7, 17]);
        assert_eq!(tree.to_string(), "10 20 \n    5 6 7 \n    12 17 \n    30 \n");

        let debug = format!("{tree:?}");
        assert!(debug.contains("MinDegree(2)"));
        assert!(debug.contains("[5, 6, 7, 10, 12, 17, 20, 30]"));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut tree = BTree::with_order(4).unwrap();
        tree.extend(0..50);
        let snapshot = tree.clone();

        for i in 0..25 {
            let _ = tree.remove(&i);
        }
        assert_eq!(snapshot.len(), 50);
        assert_eq!(snapshot.iter().copied().collect::<Vec<_>>(), (0..50).collect::<Vec<_>>());
        assert_eq!(tree.first(), Some(&25));
    }

    struct TestKey {
        key: i32,
        alive: Rc<Cell<i64>>,
    }

    impl TestKey {
        fn new(key: i32, alive: Rc<Cell<i64>>) -> Self {
            alive.set(alive.get() + 1);
            Self { key, alive }
        }
    }

    impl Drop for TestKey {
        fn drop(&mut self) {
            self.alive.set(self.alive.get() - 1);
        }
    }

    impl PartialEq for TestKey {
        fn eq(&self, other: &Self) -> bool {
            self.key == other.key
        }
    }

    impl Eq for TestKey {}

    impl PartialOrd for TestKey {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for TestKey {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.key.cmp(&other.key)
        }
    }

    #[test]
    fn test_drop() {
        let alive = Rc::new(Cell::new(0));
        let count = 4000;

        let mut tree = BTree::with_min_degree(3).unwrap();
        let mut keys = (0..count).collect::<Vec<_>>();
        keys.shuffle(&mut rand::thread_rng());
        for i in keys.iter() {
            tree.insert(TestKey::new(*i, alive.clone()));
        }
        assert_eq!(alive.get(), count as i64);

        // removed keys are handed back, not duplicated or lost
        for i in keys.iter().take(count as usize / 2) {
            let probe = TestKey::new(*i, alive.clone());
            let removed = tree.remove(&probe).removed().unwrap();
            assert_eq!(removed.key, *i);
            drop(removed);
            drop(probe);
        }
        assert_eq!(alive.get(), count as i64 / 2);

        drop(tree);
        assert_eq!(alive.get(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(i16),
        Remove(i16),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (-64i16..64).prop_map(Op::Insert),
            2 => (-64i16..64).prop_map(Op::Remove),
        ]
    }

    fn branching_strategy() -> impl Strategy<Value = Branching> {
        prop_oneof![
            (3usize..9).prop_map(Branching::Order),
            (2usize..5).prop_map(Branching::MinDegree),
        ]
    }

    proptest! {
        #[test]
        fn matches_multiset_model(
            branching in branching_strategy(),
            ops in proptest::collection::vec(op_strategy(), 0..400),
        ) {
            let mut tree = BTree::new(branching).unwrap();
            let mut model: BTreeMap<i16, usize> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(k) => {
                        tree.insert(k);
                        *model.entry(k).or_default() += 1;
                        prop_assert!(tree.contains(&k));
                    }
                    Op::Remove(k) => {
                        let expected = match model.get_mut(&k) {
                            Some(n) => {
                                *n -= 1;
                                if *n == 0 {
                                    model.remove(&k);
                                }
                                RemoveResult::Removed(k)
                            }
                            None if tree.is_empty() => RemoveResult::EmptyTree,
                            None => RemoveResult::NotFound,
                        };
                        prop_assert_eq!(tree.remove(&k), expected);
                        prop_assert_eq!(tree.contains(&k), model.contains_key(&k));
                    }
                }

                prop_assert_eq!(tree.statistic().live_nodes(), tree.node_count() as u64);
            }

            let expected = model
                .iter()
                .flat_map(|(k, n)| std::iter::repeat(*k).take(*n))
                .collect::<Vec<_>>();
            let keys = tree.iter().copied().collect::<Vec<_>>();
            prop_assert_eq!(keys, expected);
            prop_assert_eq!(tree.traverse().len(), tree.len());
            prop_assert_eq!(tree.first(), model.keys().next());
            prop_assert_eq!(tree.last(), model.keys().next_back());
        }
    }
}
