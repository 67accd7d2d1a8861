use mway_btree::{
    tree::visit::{DescendVisit, DescendVisitResult},
    BTree,
};

/// This is a dummy visitor that counts the depth of the tree
#[derive(Default)]
struct GetTreeDepth {
    depth: usize,
}

impl<K> DescendVisit<K> for GetTreeDepth {
    type Result = usize;

    fn visit_inner(&mut self, _keys: &[K]) -> DescendVisitResult<Self::Result> {
        self.depth += 1;

        // every leaf sits on the same level, any child gives the same answer
        DescendVisitResult::GoDown(0)
    }

    fn visit_leaf(&mut self, _keys: &[K]) -> Option<Self::Result> {
        self.depth += 1;
        Some(self.depth)
    }
}

fn main() {
    let mut tree = BTree::with_min_degree(32).unwrap();
    tree.extend((0..10000).map(|i| i * 10));

    println!("tree size: {}", tree.len());

    let depth = tree.descend_visit(GetTreeDepth::default());
    println!("tree depth: {depth:?}");
    assert_eq!(depth, Some(tree.height()));
}
