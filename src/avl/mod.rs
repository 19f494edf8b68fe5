//! Persistent order-statistics AVL tree.
//!
//! This module provides [`PersistentAvlTree`], an immutable ordered map from
//! string keys to values. Keys are compared byte-wise. Every node records
//! the height and the size of its subtree, which gives:
//!
//! - O(log N) insert, update, remove and lookup
//! - O(log N) rank of a key (present or not) and select by rank
//! - O(log N + k) bounded traversal in either direction
//! - O(log N + k) offset/limit pagination, without scanning from the start
//!
//! # Structural Sharing
//!
//! Mutations rebuild only the nodes on the path from the root to the
//! affected key; every other subtree is shared with the previous version.
//! A tree value is just a handle on a root, so older versions stay valid
//! and unchanged after newer ones are derived from them.
//!
//! ```rust
//! use persistent_avl::PersistentAvlTree;
//!
//! let v1 = PersistentAvlTree::new().insert("b", 2).insert("a", 1);
//! let (v2, existed) = v1.set("c", 3);
//!
//! assert!(!existed);
//! assert_eq!(v1.len(), 2); // Original unchanged
//! assert_eq!(v2.len(), 3); // New version
//! assert_eq!(v2.get("c").rank, 2);
//! ```
//!
//! # Thread Safety
//!
//! Nodes are shared through `Rc` by default. Enable the `arc` feature to
//! share them through `Arc`, which makes tree versions `Send + Sync` so many
//! threads can read the same or different versions concurrently. Publishing
//! a new "current" version between writers is left to the caller.

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod error;
mod mutation;
mod node;
mod query;
mod rotation;
mod traversal;
mod tree;

pub use error::AvlError;
pub use error::AvlResult;
pub use error::InvariantViolation;
pub use traversal::OffsetPolicy;
pub use traversal::Order;
pub use traversal::Visit;
pub use tree::Lookup;
pub use tree::PersistentAvlTree;
pub use tree::PersistentAvlTreeIterator;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod reference_counter_tests {
    use super::ReferenceCounter;
    use rstest::rstest;

    #[rstest]
    fn test_reference_counter_shares_str() {
        let key: ReferenceCounter<str> = ReferenceCounter::from("key");
        let key_clone = key.clone();
        assert!(ReferenceCounter::ptr_eq(&key, &key_clone));
        assert_eq!(&*key_clone, "key");
    }

    #[rstest]
    fn test_reference_counter_strong_count() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
        let reference_counter_clone = reference_counter.clone();
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 2);
        drop(reference_counter_clone);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
    }
}
