//! Error types for the AVL tree.
//!
//! Absence of a key is never an error: lookups and removals report it
//! through their regular return values. The errors below are reserved for
//! requests that cannot be answered at all.

use thiserror::Error;

/// Errors returned by fallible tree operations.
///
/// Both variants are raised before any node is visited, so a failed call
/// never leaves a partially observed result behind.
///
/// # Examples
///
/// ```rust
/// use persistent_avl::{AvlError, PersistentAvlTree};
///
/// let tree: PersistentAvlTree<()> = PersistentAvlTree::new();
/// assert_eq!(
///     tree.get_by_index(0),
///     Err(AvlError::IndexOutOfRange { index: 0, len: 0 })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvlError {
    /// Select-by-rank was asked for a position outside `[0, len)`.
    #[error("index {index} is out of range for a tree of {len} entries")]
    IndexOutOfRange {
        /// The requested position.
        index: usize,
        /// The number of entries in the tree.
        len: usize,
    },

    /// A strict paginated traversal was asked for a window that does not
    /// fit inside the sorted sequence.
    #[error("window of {limit} entries at offset {offset} exceeds a tree of {len} entries")]
    WindowOutOfRange {
        /// Position of the first requested entry.
        offset: usize,
        /// Number of requested entries.
        limit: usize,
        /// The number of entries in the tree.
        len: usize,
    },
}

/// Result alias for fallible tree operations.
pub type AvlResult<T> = Result<T, AvlError>;

/// A structural invariant that does not hold in a tree.
///
/// Produced by [`PersistentAvlTree::verify_invariants`](super::PersistentAvlTree::verify_invariants).
/// A tree built only through the public API never reports one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A key is not strictly between the keys bounding its subtree.
    #[error("key {key:?} violates the search-tree ordering")]
    Ordering {
        /// The misplaced key.
        key: String,
    },

    /// The child heights of a node differ by more than one.
    #[error("node {key:?} is unbalanced (balance factor {factor})")]
    Unbalanced {
        /// Key of the unbalanced node.
        key: String,
        /// `height(left) - height(right)`.
        factor: i16,
    },

    /// A node records a height that does not match its children.
    #[error("node {key:?} records height {recorded} but has height {actual}")]
    StaleHeight {
        /// Key of the node.
        key: String,
        /// Height stored in the node.
        recorded: u8,
        /// Height recomputed from the children.
        actual: u8,
    },

    /// A node records a subtree size that does not match its children.
    #[error("node {key:?} records size {recorded} but has size {actual}")]
    StaleSize {
        /// Key of the node.
        key: String,
        /// Size stored in the node.
        recorded: usize,
        /// Size recomputed from the children.
        actual: usize,
    },
}
