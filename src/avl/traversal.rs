//! In-order traversals with bounds, early exit and offset pagination.
//!
//! Bounded walks descend only into subtrees that can still hold a key in
//! range, so a narrow range costs O(log N + k) rather than a full scan.
//! Paginated walks use the cached subtree sizes to jump straight to the
//! first requested position and then follow successors with an explicit
//! ancestor stack.

use super::ReferenceCounter;
use super::node::{Node, size};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::ops::Bound;

/// Inline capacity of the ancestor stack.
///
/// An AVL tree of `usize::MAX` entries is shorter than this, so the stack
/// never spills to the heap in practice.
const STACK_INLINE: usize = 96;

/// The answer of a traversal visitor.
///
/// Traversals call the visitor once per entry and halt as soon as it
/// returns [`Visit::Stop`]. The traversal itself reports `Stop` when the
/// visitor ended it early and `Continue` when it ran to completion.
///
/// # Examples
///
/// ```rust
/// use persistent_avl::{PersistentAvlTree, Visit};
///
/// let tree = PersistentAvlTree::new()
///     .insert("a", 1)
///     .insert("b", 2)
///     .insert("c", 3);
///
/// let mut seen = Vec::new();
/// let outcome = tree.iterate("", "", |key, _| {
///     seen.push(key.to_string());
///     if key == "b" {
///         Visit::Stop
///     } else {
///         Visit::Continue
///     }
/// });
///
/// assert_eq!(seen, vec!["a", "b"]);
/// assert_eq!(outcome, Visit::Stop);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Visit {
    /// Keep walking.
    #[default]
    Continue,
    /// Halt the traversal immediately.
    Stop,
}

impl Visit {
    /// Returns `true` for [`Visit::Stop`].
    #[inline]
    #[must_use]
    pub const fn is_stop(self) -> bool {
        matches!(self, Self::Stop)
    }

    /// Returns `true` for [`Visit::Continue`].
    #[inline]
    #[must_use]
    pub const fn is_continue(self) -> bool {
        matches!(self, Self::Continue)
    }
}

/// Direction of a traversal over the sorted key sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// Smallest key first.
    #[default]
    Ascending,
    /// Largest key first.
    Descending,
}

impl Order {
    /// The child visited before the node itself.
    fn near<V>(self, node: &Node<V>) -> Option<&ReferenceCounter<Node<V>>> {
        match self {
            Self::Ascending => node.left.as_ref(),
            Self::Descending => node.right.as_ref(),
        }
    }

    /// The child visited after the node itself.
    fn far<V>(self, node: &Node<V>) -> Option<&ReferenceCounter<Node<V>>> {
        match self {
            Self::Ascending => node.right.as_ref(),
            Self::Descending => node.left.as_ref(),
        }
    }
}

/// How a paginated traversal treats a window that runs past the end.
///
/// # Examples
///
/// ```rust
/// use persistent_avl::{AvlError, OffsetPolicy, Order, PersistentAvlTree, Visit};
///
/// let tree: PersistentAvlTree<()> = ["a", "b", "c"].into_iter().map(|key| (key, ())).collect();
///
/// // Clamp clips the window to the entries that exist.
/// let mut keys = Vec::new();
/// tree.traverse_by_offset(2, 10, Order::Ascending, OffsetPolicy::Clamp, |key, _| {
///     keys.push(key.to_string());
///     Visit::Continue
/// })
/// .unwrap();
/// assert_eq!(keys, vec!["c"]);
///
/// // Strict refuses it up front.
/// let result = tree.traverse_by_offset(2, 10, Order::Ascending, OffsetPolicy::Strict, |_, _| {
///     Visit::Continue
/// });
/// assert_eq!(
///     result,
///     Err(AvlError::WindowOutOfRange { offset: 2, limit: 10, len: 3 })
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum OffsetPolicy {
    /// Visit whatever part of the window exists; an offset at or past the
    /// end visits nothing.
    #[default]
    Clamp,
    /// Fail with [`AvlError::WindowOutOfRange`](super::AvlError::WindowOutOfRange)
    /// unless the whole window lies inside the sequence.
    Strict,
}

/// A key interval with independent bounds on each side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct KeyRange<'a> {
    lower: Bound<&'a str>,
    upper: Bound<&'a str>,
}

impl<'a> KeyRange<'a> {
    pub(crate) const fn new(lower: Bound<&'a str>, upper: Bound<&'a str>) -> Self {
        Self { lower, upper }
    }

    /// `[start, end)`, where an empty string leaves that side unbounded.
    pub(crate) fn half_open(start: &'a str, end: &'a str) -> Self {
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start)
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };
        Self::new(lower, upper)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        let above_lower = match self.lower {
            Bound::Included(lower) => key >= lower,
            Bound::Excluded(lower) => key > lower,
            Bound::Unbounded => true,
        };
        let below_upper = match self.upper {
            Bound::Included(upper) => key <= upper,
            Bound::Excluded(upper) => key < upper,
            Bound::Unbounded => true,
        };
        above_lower && below_upper
    }

    /// Whether keys smaller than `key` can fall in the range.
    fn reaches_below(&self, key: &str) -> bool {
        match self.lower {
            Bound::Included(lower) | Bound::Excluded(lower) => lower < key,
            Bound::Unbounded => true,
        }
    }

    /// Whether keys larger than `key` can fall in the range.
    fn reaches_above(&self, key: &str) -> bool {
        match self.upper {
            Bound::Included(upper) | Bound::Excluded(upper) => key < upper,
            Bound::Unbounded => true,
        }
    }
}

/// Visits every entry of `range` in the given order, pruning subtrees that
/// lie entirely outside it.
pub(crate) fn walk<V, F>(
    node: Option<&ReferenceCounter<Node<V>>>,
    range: &KeyRange<'_>,
    order: Order,
    visitor: &mut F,
) -> Visit
where
    F: FnMut(&str, &V) -> Visit,
{
    let Some(node) = node else {
        return Visit::Continue;
    };
    let key: &str = &node.key;

    let (enter_near, enter_far) = match order {
        Order::Ascending => (range.reaches_below(key), range.reaches_above(key)),
        Order::Descending => (range.reaches_above(key), range.reaches_below(key)),
    };

    if enter_near && walk(order.near(node), range, order, visitor).is_stop() {
        return Visit::Stop;
    }
    if range.contains(key) && visitor(key, &node.value).is_stop() {
        return Visit::Stop;
    }
    if enter_far {
        return walk(order.far(node), range, order, visitor);
    }
    Visit::Continue
}

/// Visits up to `limit` entries starting at position `offset` of the
/// sequence in the given order. An offset at or past the end visits nothing.
pub(crate) fn paginate<V, F>(
    node: Option<&ReferenceCounter<Node<V>>>,
    offset: usize,
    limit: usize,
    order: Order,
    visitor: &mut F,
) -> Visit
where
    F: FnMut(&str, &V) -> Visit,
{
    for entry in Cursor::seek(node, offset, order).take(limit) {
        if visitor(&entry.key, &entry.value).is_stop() {
            return Visit::Stop;
        }
    }
    Visit::Continue
}

/// A successor walk over a subtree in either order.
///
/// The stack holds the nodes that are still to be yielded, each of which
/// has its far subtree pending as well.
pub(crate) struct Cursor<'a, V> {
    stack: SmallVec<[&'a Node<V>; STACK_INLINE]>,
    order: Order,
}

impl<'a, V> Cursor<'a, V> {
    /// Positions a cursor on the entry at `offset`, descending by subtree
    /// sizes in O(log N).
    pub(crate) fn seek(
        mut node: Option<&'a ReferenceCounter<Node<V>>>,
        mut offset: usize,
        order: Order,
    ) -> Self {
        let mut stack = SmallVec::new();
        while let Some(current) = node {
            let near = order.near(current);
            let near_size = size(near);
            match offset.cmp(&near_size) {
                Ordering::Less => {
                    stack.push(&**current);
                    node = near;
                }
                Ordering::Equal => {
                    stack.push(&**current);
                    break;
                }
                Ordering::Greater => {
                    offset -= near_size + 1;
                    node = order.far(current);
                }
            }
        }
        Self { stack, order }
    }
}

impl<'a, V> Iterator for Cursor<'a, V> {
    type Item = &'a Node<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let mut pending = self.order.far(node);
        while let Some(current) = pending {
            self.stack.push(&**current);
            pending = self.order.near(current);
        }
        Some(node)
    }
}
