//! Console driver: reads the order `m`, then keys until `-1`, prints the tree level by level,
//! then inserts one more key and removes one, printing after each step.
//!
//! ```text
//! echo "4  10 20 5 6 12 30 7 17 -1  3  6" | cargo run --example levels
//! ```
use std::{error::Error, io};

use tracing::info;
use tracing_subscriber::EnvFilter;

use mway_btree::{BTree, RemoveResult};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let input = io::read_to_string(io::stdin())?;
    let mut numbers = input.split_whitespace().map(str::parse::<i64>);
    let mut next = || -> Result<Option<i64>, Box<dyn Error>> {
        Ok(numbers.next().transpose()?)
    };

    let m = next()?.ok_or("missing order")?;
    let mut tree = BTree::with_order(usize::try_from(m)?)?;
    info!(branching = %tree.branching(), "tree created");

    while let Some(k) = next()? {
        if k == -1 {
            break;
        }
        tree.insert(k);
    }
    println!("{tree}");

    if let Some(k) = next()? {
        tree.insert(k);
        println!("after inserting {k}:");
        println!("{tree}");
    }

    if let Some(k) = next()? {
        match tree.remove(&k) {
            RemoveResult::Removed(_) => println!("after removing {k}:"),
            RemoveResult::NotFound => println!("{k} is not in the tree"),
            RemoveResult::EmptyTree => println!("the tree is empty"),
        }
        println!("{tree}");
    }

    info!(len = tree.len(), height = tree.height(), "done");
    Ok(())
}
