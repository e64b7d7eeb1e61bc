//! Pooled red-black tree used for identifier-keyed lookups.

mod iter;
mod tree;


pub use iter::{Cursor, Iter};
pub use tree::{Comparator, ComparatorFn, NaturalOrder, RBTree};

use std::fmt;

/// Errors raised by tree cursors and bulk loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RBTreeError {
    /// The tree changed structurally after the cursor was opened.
    ConcurrentModification,
    /// `Cursor::remove` without a preceding successful `Cursor::next`.
    IllegalState,
    /// `build_from_sorted` input was not strictly ascending or shorter than announced.
    UnsortedInput,
}

impl fmt::Display for RBTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RBTreeError::ConcurrentModification => {
                write!(f, "Tree modified while a cursor was open")
            }
            RBTreeError::IllegalState => write!(f, "No current entry to remove"),
            RBTreeError::UnsortedInput => {
                write!(f, "Input is not sorted by strictly ascending key")
            }
        }
    }
}

impl std::error::Error for RBTreeError {}
