//! In memory m-way B-tree.
//!
//! [`BTree`] keeps ordered keys in nodes of bounded size. Inserts split full nodes on the
//! way down, removes borrow from or merge with siblings on the way down, so every leaf
//! stays at the same depth and every non-root node stays within its [`Capacity`].
//!
//! The node size is picked once, at construction, with [`Branching`]:
//!
//! ```rust
//! use mway_btree::{BTree, Branching, Error};
//!
//! // order 4, a 2-3-4 tree
//! let mut tree = BTree::new(Branching::Order(4)).unwrap();
//! tree.extend(1..=7);
//! assert_eq!(tree.len(), 7);
//!
//! // the same shape spelled as a minimum degree
//! let same = BTree::<i32>::new("degree=2".parse().unwrap()).unwrap();
//! assert_eq!(same.capacity(), tree.capacity());
//!
//! assert_eq!(BTree::<i32>::with_order(2).err(), Some(Error::InvalidOrder(2)));
//! ```

mod error;
pub use error::{Error, Result};

// core tree impl
pub mod tree;
pub use tree::{BTree, Branching, Capacity, Iter, NodeRef, RemoveResult, Statistic, Traverse};
