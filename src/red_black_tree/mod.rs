//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions.

mod map;
mod node;
mod set;
mod tree;

pub use self::map::{RedBlackMap, RedBlackMapIter};
pub use self::node::Color;
pub use self::set::{RedBlackSet, RedBlackSetIter};

use std::error;
use std::fmt;
use std::result;

/// A broken red black tree invariant, as reported by `validate`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The root node is colored red.
    RedRoot,
    /// The sentinel does not read as black.
    RedSentinel,
    /// A red node has a red child.
    ConsecutiveRed,
    /// Two paths from the root to the sentinel pass through different numbers of black nodes.
    BlackHeightMismatch { expected: usize, found: usize },
    /// A key is smaller than a key in its left subtree or larger than a key in its right
    /// subtree.
    OrderViolation,
    /// A child does not point back to the node that holds it, or the root has a parent.
    ParentMismatch,
    /// The number of reachable nodes differs from the recorded length.
    LengthMismatch { expected: usize, found: usize },
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::RedRoot => write!(f, "root node is red"),
            Error::RedSentinel => write!(f, "sentinel node is red"),
            Error::ConsecutiveRed => write!(f, "red node has a red child"),
            Error::BlackHeightMismatch { expected, found } => write!(
                f,
                "black height mismatch: expected {}, found {}",
                expected, found
            ),
            Error::OrderViolation => write!(f, "keys are out of order"),
            Error::ParentMismatch => write!(f, "parent and child links disagree"),
            Error::LengthMismatch { expected, found } => write!(
                f,
                "length mismatch: expected {} nodes, found {}",
                expected, found
            ),
        }
    }
}

/// Convenience `Result` type for invariant checks.
pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::RedRoot.to_string(), "root node is red");
        assert_eq!(
            Error::BlackHeightMismatch {
                expected: 2,
                found: 3
            }
            .to_string(),
            "black height mismatch: expected 2, found 3",
        );
    }
}
