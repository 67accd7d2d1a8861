use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing_subscriber::EnvFilter;

use mway_btree::{BTree, Branching};

const RAND_SEED: u64 = 123;
const COUNT: usize = 100000;

#[inline(never)]
fn create_tree(branching: Branching) -> BTree<usize> {
    let mut tree = BTree::new(branching).unwrap();

    let mut keys = (0..COUNT).collect::<Vec<_>>();
    keys.shuffle(&mut rand::thread_rng());

    for k in keys {
        tree.insert(k);
    }

    println!("{} keys, height {}", tree.len(), tree.height());
    tree
}

#[inline(never)]
fn delete_tree(tree: &mut BTree<usize>) {
    let mut keys = tree.iter().copied().collect::<Vec<_>>();
    let mut r = StdRng::seed_from_u64(RAND_SEED);
    keys.shuffle(&mut r);

    for k in keys.iter() {
        assert!(tree.remove(k).is_removed());
    }
    println!("{}", tree.len());
    println!("{:#?}", tree.statistic());
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // `stress order=5` or `stress degree=16`, defaults to degree=32
    let branching = match std::env::args().nth(1) {
        Some(arg) => arg.parse().unwrap(),
        None => Branching::MinDegree(32),
    };

    let mut tree = create_tree(branching);
    delete_tree(&mut tree);
    assert!(tree.is_empty());
    assert_eq!(tree.statistic().live_nodes(), 0);
}
