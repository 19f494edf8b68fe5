//! # persistent-avl
//!
//! A persistent (immutable, copy-on-write) AVL tree keyed by byte-ordered
//! strings, augmented with subtree sizes for order-statistics queries.
//!
//! ## Overview
//!
//! The crate is the indexing core of an embedded key-value store or a
//! versioned state tree. It provides:
//!
//! - **Persistent mutation**: `set`/`remove` return a new version and leave
//!   every earlier version intact, sharing all untouched subtrees
//! - **Order statistics**: the rank of any key (present or not) and the key
//!   at any rank, both in O(log N)
//! - **Bounded traversal**: ascending, descending and explicit-bound walks
//!   with early exit through [`Visit`]
//! - **Pagination**: offset/limit pages in either direction without scanning
//!   from the start
//!
//! ## Feature Flags
//!
//! - `arc`: share nodes through `Arc`, making tree versions `Send + Sync`
//!
//! ## Example
//!
//! ```rust
//! use persistent_avl::prelude::*;
//!
//! let tree = PersistentAvlTree::new()
//!     .insert("C", ())
//!     .insert("A", ())
//!     .insert("B", ())
//!     .insert("E", ())
//!     .insert("D", ());
//!
//! assert_eq!(tree.get_by_index(2).map(|(key, _)| key), Ok("C"));
//!
//! let (smaller, removed) = tree.remove("C");
//! assert!(removed.is_some());
//! assert_eq!(smaller.keys().collect::<Vec<_>>(), vec!["A", "B", "D", "E"]);
//! assert_eq!(tree.len(), 5); // the original version is untouched
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types.
///
/// # Usage
///
/// ```rust
/// use persistent_avl::prelude::*;
/// ```
pub mod prelude {
    pub use crate::avl::*;
}

pub mod avl;

pub use avl::{
    AvlError, AvlResult, InvariantViolation, Lookup, OffsetPolicy, Order, PersistentAvlTree,
    PersistentAvlTreeIterator, Visit,
};
