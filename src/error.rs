use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// Order `m` bounds a node at `m - 1` keys, anything below 3 leaves no room to split.
    #[error("invalid order {0}: order must be at least 3")]
    InvalidOrder(usize),

    /// Minimum degree `t` bounds a node at `2t - 1` keys.
    #[error("invalid minimum degree {0}: degree must be at least 2")]
    InvalidMinDegree(usize),

    #[error("invalid branching {0:?}: expected `order=<m>` or `degree=<t>`")]
    InvalidBranching(String),
}
