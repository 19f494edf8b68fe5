//! Point lookups and order-statistics navigation.
//!
//! These are pure reads. Rank and select use the cached subtree sizes, so
//! both run in O(log N) without visiting anything off the search path.

use super::ReferenceCounter;
use super::node::{Node, size};
use std::cmp::Ordering;

/// Looks up `key`, returning its rank and its value if present.
///
/// When the key is absent the rank is the number of keys strictly less
/// than it, i.e. the position it would be inserted at.
pub(crate) fn lookup<'a, V>(
    mut node: Option<&'a ReferenceCounter<Node<V>>>,
    key: &str,
) -> (usize, Option<&'a V>) {
    let mut rank = 0;
    while let Some(current) = node {
        match key.cmp(&*current.key) {
            Ordering::Less => node = current.left.as_ref(),
            Ordering::Greater => {
                rank += size(current.left.as_ref()) + 1;
                node = current.right.as_ref();
            }
            Ordering::Equal => {
                rank += size(current.left.as_ref());
                return (rank, Some(&current.value));
            }
        }
    }
    (rank, None)
}

/// Returns the node at zero-based position `index` in ascending order, or
/// `None` when the subtree has no such position.
pub(crate) fn select<V>(
    mut node: Option<&ReferenceCounter<Node<V>>>,
    mut index: usize,
) -> Option<&Node<V>> {
    while let Some(current) = node {
        let left_size = size(current.left.as_ref());
        match index.cmp(&left_size) {
            Ordering::Less => node = current.left.as_ref(),
            Ordering::Equal => return Some(&**current),
            Ordering::Greater => {
                index -= left_size + 1;
                node = current.right.as_ref();
            }
        }
    }
    None
}

/// Returns the node with the smallest key.
pub(crate) fn first<V>(node: Option<&ReferenceCounter<Node<V>>>) -> Option<&Node<V>> {
    let mut current = node?;
    while let Some(left) = current.left.as_ref() {
        current = left;
    }
    Some(&**current)
}

/// Returns the node with the largest key.
pub(crate) fn last<V>(node: Option<&ReferenceCounter<Node<V>>>) -> Option<&Node<V>> {
    let mut current = node?;
    while let Some(right) = current.right.as_ref() {
        current = right;
    }
    Some(&**current)
}
