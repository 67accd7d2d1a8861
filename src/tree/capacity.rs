use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// How the caller sizes the tree's nodes.
///
/// Both parameterizations drive the same rebalancing core, they only differ in how the
/// maximum key count is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branching {
    /// Knuth order `m`: a node has at most `m` children, so at most `m - 1` keys.
    Order(usize),
    /// Minimum degree `t`: a node holds at most `2t - 1` keys and, outside the root,
    /// at least `t - 1`.
    MinDegree(usize),
}

impl Branching {
    /// Validate the parameter and derive the node bounds from it.
    ///
    /// # Examples
    /// ```rust
    /// use mway_btree::Branching;
    ///
    /// let cap = Branching::MinDegree(2).capacity().unwrap();
    /// assert_eq!(cap.max_keys(), 3);
    /// assert_eq!(cap.min_keys(), 1);
    ///
    /// assert!(Branching::Order(2).capacity().is_err());
    /// ```
    pub fn capacity(self) -> Result<Capacity> {
        let max_keys = match self {
            Branching::Order(m) if m >= 3 => m - 1,
            Branching::Order(m) => return Err(Error::InvalidOrder(m)),
            Branching::MinDegree(t) if t >= 2 => t
                .checked_mul(2)
                .map(|n| n - 1)
                .ok_or(Error::InvalidMinDegree(t))?,
            Branching::MinDegree(t) => return Err(Error::InvalidMinDegree(t)),
        };

        Ok(Capacity::from_max_keys(max_keys))
    }
}

impl fmt::Display for Branching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branching::Order(m) => write!(f, "order={m}"),
            Branching::MinDegree(t) => write!(f, "degree={t}"),
        }
    }
}

/// Parses `order=<m>` (alias `m=<m>`) or `degree=<t>` (alias `t=<t>`).
/// The value is only parsed here, range checks happen in [`Branching::capacity`].
impl FromStr for Branching {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidBranching(s.to_string());

        let (name, value) = s.split_once('=').ok_or_else(invalid)?;
        let value: usize = value.trim().parse().map_err(|_| invalid())?;

        match name.trim() {
            "order" | "m" => Ok(Branching::Order(value)),
            "degree" | "t" => Ok(Branching::MinDegree(value)),
            _ => Err(invalid()),
        }
    }
}

/// Key count bounds for every node of a tree.
///
/// `min_keys` is `(max_keys - 1) / 2`, the largest floor that both a preemptive split of a
/// full node and a merge of two minimal siblings can honor. It is the classical
/// `ceil(B / 2) - 1` for every degree based tree and for even orders, and one less than
/// that for odd orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    max_keys: usize,
    min_keys: usize,
}

impl Capacity {
    fn from_max_keys(max_keys: usize) -> Self {
        debug_assert!(max_keys >= 2);
        Self {
            max_keys,
            min_keys: (max_keys - 1) / 2,
        }
    }

    /// Max key count of any node, a node holding this many keys is full
    pub const fn max_keys(&self) -> usize {
        self.max_keys
    }

    /// Min key count of any non-root node
    pub const fn min_keys(&self) -> usize {
        self.min_keys
    }

    /// Offset of the key promoted to the parent when a full node splits
    pub(crate) const fn split_index(&self) -> usize {
        self.max_keys / 2
    }
}
