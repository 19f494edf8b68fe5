//! The augmented tree node and its bookkeeping.
//!
//! Every node caches the height and the size of the subtree rooted at it.
//! Both are computed once, by [`Node::new`], from the children handed to the
//! constructor. Nodes are never mutated after construction, so the cached
//! values cannot go stale.

use super::ReferenceCounter;
use super::error::InvariantViolation;
use std::cmp::Ordering;

/// A shared handle to a subtree, `None` for the empty tree.
pub(crate) type Link<V> = Option<ReferenceCounter<Node<V>>>;

/// Internal node structure for the AVL tree.
#[derive(Clone)]
pub(crate) struct Node<V> {
    pub(crate) key: ReferenceCounter<str>,
    pub(crate) value: V,
    pub(crate) left: Link<V>,
    pub(crate) right: Link<V>,
    height: u8,
    size: usize,
}

impl<V> Node<V> {
    /// Creates a node over the given children, computing height and size.
    pub(crate) fn new(key: ReferenceCounter<str>, value: V, left: Link<V>, right: Link<V>) -> Self {
        let height = 1 + height(left.as_ref()).max(height(right.as_ref()));
        let size = 1 + size(left.as_ref()) + size(right.as_ref());
        Self {
            key,
            value,
            left,
            right,
            height,
            size,
        }
    }

    /// Creates a node with no children.
    pub(crate) fn leaf(key: &str, value: V) -> Self {
        Self::new(ReferenceCounter::from(key), value, None, None)
    }

    /// Creates a copy of this node with new children.
    pub(crate) fn with_children(&self, left: Link<V>, right: Link<V>) -> Self
    where
        V: Clone,
    {
        Self::new(self.key.clone(), self.value.clone(), left, right)
    }

    /// Consumes this node, replacing its left child.
    pub(crate) fn with_left(self, left: Link<V>) -> Self {
        Self::new(self.key, self.value, left, self.right)
    }

    /// Consumes this node, replacing its right child.
    pub(crate) fn with_right(self, right: Link<V>) -> Self {
        Self::new(self.key, self.value, self.left, right)
    }

    pub(crate) const fn height(&self) -> u8 {
        self.height
    }

    pub(crate) const fn size(&self) -> usize {
        self.size
    }

    /// `height(left) - height(right)`.
    pub(crate) fn balance_factor(&self) -> i16 {
        i16::from(height(self.left.as_ref())) - i16::from(height(self.right.as_ref()))
    }
}

/// Height of an optional subtree; the empty tree has height 0.
pub(crate) fn height<V>(node: Option<&ReferenceCounter<Node<V>>>) -> u8 {
    node.map_or(0, |node| node.height())
}

/// Number of entries in an optional subtree; the empty tree has size 0.
pub(crate) fn size<V>(node: Option<&ReferenceCounter<Node<V>>>) -> usize {
    node.map_or(0, |node| node.size())
}

/// Checks every structural invariant of a subtree.
///
/// Returns the first violation found in a post-order walk.
pub(crate) fn verify<V>(
    node: Option<&ReferenceCounter<Node<V>>>,
) -> Result<(), InvariantViolation> {
    verify_bounded(node, None, None).map(|_| ())
}

/// Returns the recomputed `(height, size)` of a subtree whose keys must lie
/// strictly between `lower` and `upper`.
fn verify_bounded<V>(
    node: Option<&ReferenceCounter<Node<V>>>,
    lower: Option<&str>,
    upper: Option<&str>,
) -> Result<(u8, usize), InvariantViolation> {
    let Some(node) = node else {
        return Ok((0, 0));
    };
    let key: &str = &node.key;

    let above_lower = lower.is_none_or(|lower| lower.cmp(key) == Ordering::Less);
    let below_upper = upper.is_none_or(|upper| key.cmp(upper) == Ordering::Less);
    if !(above_lower && below_upper) {
        return Err(InvariantViolation::Ordering {
            key: key.to_string(),
        });
    }

    let (left_height, left_size) = verify_bounded(node.left.as_ref(), lower, Some(key))?;
    let (right_height, right_size) = verify_bounded(node.right.as_ref(), Some(key), upper)?;

    let factor = i16::from(left_height) - i16::from(right_height);
    if !(-1..=1).contains(&factor) {
        return Err(InvariantViolation::Unbalanced {
            key: key.to_string(),
            factor,
        });
    }

    let actual_height = 1 + left_height.max(right_height);
    if node.height != actual_height {
        return Err(InvariantViolation::StaleHeight {
            key: key.to_string(),
            recorded: node.height,
            actual: actual_height,
        });
    }

    let actual_size = 1 + left_size + right_size;
    if node.size != actual_size {
        return Err(InvariantViolation::StaleSize {
            key: key.to_string(),
            recorded: node.size,
            actual: actual_size,
        });
    }

    Ok((actual_height, actual_size))
}
