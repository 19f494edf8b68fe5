//! The public tree handle.
//!
//! [`PersistentAvlTree`] wraps an optional root and exposes the node-level
//! engines (mutation, query, traversal) as a persistent map API. Cloning a
//! tree is O(1): it only bumps the reference count of the root.

use super::ReferenceCounter;
use super::error::{AvlError, AvlResult, InvariantViolation};
use super::mutation;
use super::node::{self, Link};
use super::query;
use super::traversal::{self, Cursor, KeyRange, OffsetPolicy, Order, Visit};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::ops::Bound;

// =============================================================================
// Lookup Result
// =============================================================================

/// The outcome of [`PersistentAvlTree::get`].
///
/// `rank` is meaningful whether or not the key is present: for a present key
/// it is the key's zero-based position in ascending order, for an absent key
/// it is the number of keys strictly less than it.
#[derive(Debug, PartialEq, Eq)]
pub struct Lookup<'a, V> {
    /// Position of the key (or of its insertion point) in ascending order.
    pub rank: usize,
    /// The value stored under the key, `None` when the key is absent.
    pub value: Option<&'a V>,
}

impl<V> Lookup<'_, V> {
    /// Returns `true` if the key is present.
    #[inline]
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.value.is_some()
    }
}

impl<V> Clone for Lookup<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Lookup<'_, V> {}

// =============================================================================
// PersistentAvlTree Definition
// =============================================================================

/// A persistent (immutable) ordered map from string keys to values, based on
/// an AVL tree augmented with subtree sizes.
///
/// Keys are compared byte-wise. Values are shared by every version that
/// still references their node, so the tree only ever hands out `&V`.
///
/// # Time Complexity
///
/// | Operation            | Complexity   |
/// |----------------------|--------------|
/// | `new` / `clone`      | O(1)         |
/// | `len` / `is_empty`   | O(1)         |
/// | `set` / `insert`     | O(log N)     |
/// | `remove` / `without` | O(log N)     |
/// | `get` / `has`        | O(log N)     |
/// | `rank`               | O(log N)     |
/// | `get_by_index`       | O(log N)     |
/// | `iterate`            | O(log N + k) |
/// | `traverse_by_offset` | O(log N + k) |
///
/// # Examples
///
/// ```rust
/// use persistent_avl::PersistentAvlTree;
///
/// let tree = PersistentAvlTree::new()
///     .insert("C", 3)
///     .insert("A", 1)
///     .insert("B", 2);
///
/// let keys: Vec<&str> = tree.keys().collect();
/// assert_eq!(keys, vec!["A", "B", "C"]);
///
/// assert_eq!(tree.get_by_index(1), Ok(("B", &2)));
/// assert_eq!(tree.get("B").rank, 1);
/// assert_eq!(tree.get("BB").rank, 2); // insertion position
/// ```
#[derive(Clone)]
pub struct PersistentAvlTree<V> {
    /// Root node of the tree
    root: Link<V>,
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentAvlTree<i32>: Send, Sync);
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentAvlTree<String>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentAvlTree<i32>: Send, Sync);

impl<V> PersistentAvlTree<V> {
    /// Creates a new empty tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::PersistentAvlTree;
    ///
    /// let tree: PersistentAvlTree<String> = PersistentAvlTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Returns the number of entries in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        node::size(self.root.as_ref())
    }

    /// Returns `true` if the tree contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the height of the tree, 0 for the empty tree.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        usize::from(node::height(self.root.as_ref()))
    }

    /// Returns `true` if both handles point at the same version.
    ///
    /// Removing an absent key hands back the very same version, which this
    /// makes observable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::PersistentAvlTree;
    ///
    /// let tree = PersistentAvlTree::new().insert("a", 1);
    /// let (unchanged, removed) = tree.remove("z");
    /// assert!(removed.is_none());
    /// assert!(tree.ptr_eq(&unchanged));
    /// ```
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(left), Some(right)) => ReferenceCounter::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        }
    }

    /// Looks up a key, returning its rank together with its value.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::PersistentAvlTree;
    ///
    /// let tree: PersistentAvlTree<()> = ["A", "B", "C", "D", "E"]
    ///     .into_iter()
    ///     .map(|key| (key, ()))
    ///     .collect();
    ///
    /// let found = tree.get("B");
    /// assert!(found.exists());
    /// assert_eq!(found.rank, 1);
    ///
    /// let missing = tree.get("F");
    /// assert!(!missing.exists());
    /// assert_eq!(missing.rank, 5);
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Lookup<'_, V> {
        let (rank, value) = query::lookup(self.root.as_ref(), key);
        Lookup { rank, value }
    }

    /// Returns the number of keys strictly less than `key`.
    ///
    /// For a present key this is its zero-based position.
    #[inline]
    #[must_use]
    pub fn rank(&self, key: &str) -> usize {
        self.get(key).rank
    }

    /// Returns `true` if the tree contains `key`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.get(key).exists()
    }

    /// Returns the entry at zero-based position `index` in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`AvlError::IndexOutOfRange`] if `index >= self.len()`,
    /// which includes every index on an empty tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::{AvlError, PersistentAvlTree};
    ///
    /// let tree = PersistentAvlTree::new().insert("b", 2).insert("a", 1);
    /// assert_eq!(tree.get_by_index(0), Ok(("a", &1)));
    /// assert_eq!(
    ///     tree.get_by_index(2),
    ///     Err(AvlError::IndexOutOfRange { index: 2, len: 2 })
    /// );
    /// ```
    pub fn get_by_index(&self, index: usize) -> AvlResult<(&str, &V)> {
        let len = self.len();
        let found = (index < len)
            .then(|| query::select(self.root.as_ref(), index))
            .flatten();
        found.map(|node| (&*node.key, &node.value)).ok_or_else(|| {
            tracing::debug!(index, len, "select by rank out of range");
            AvlError::IndexOutOfRange { index, len }
        })
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(&str, &V)> {
        query::first(self.root.as_ref()).map(|node| (&*node.key, &node.value))
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<(&str, &V)> {
        query::last(self.root.as_ref()).map(|node| (&*node.key, &node.value))
    }

    /// Visits the entries of `[start, end)` in ascending order.
    ///
    /// An empty `start` leaves the range unbounded below and an empty `end`
    /// leaves it unbounded above, so `iterate("", "", ..)` walks the whole
    /// tree. The walk halts as soon as `visitor` returns [`Visit::Stop`].
    ///
    /// Returns [`Visit::Stop`] if the visitor ended the walk early.
    ///
    /// # Complexity
    ///
    /// O(log N + k) where k is the number of visited entries
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::{PersistentAvlTree, Visit};
    ///
    /// let tree: PersistentAvlTree<()> = ["A", "B", "C", "D"]
    ///     .into_iter()
    ///     .map(|key| (key, ()))
    ///     .collect();
    ///
    /// let mut keys = Vec::new();
    /// tree.iterate("B", "D", |key, _| {
    ///     keys.push(key.to_string());
    ///     Visit::Continue
    /// });
    /// assert_eq!(keys, vec!["B", "C"]);
    /// ```
    pub fn iterate<F>(&self, start: &str, end: &str, mut visitor: F) -> Visit
    where
        F: FnMut(&str, &V) -> Visit,
    {
        let range = KeyRange::half_open(start, end);
        traversal::walk(self.root.as_ref(), &range, Order::Ascending, &mut visitor)
    }

    /// Visits the entries of `[start, end)` in descending order.
    ///
    /// Bounds behave exactly as in [`iterate`](Self::iterate), so the
    /// visited sequence is the reverse of the one `iterate` produces.
    pub fn reverse_iterate<F>(&self, start: &str, end: &str, mut visitor: F) -> Visit
    where
        F: FnMut(&str, &V) -> Visit,
    {
        let range = KeyRange::half_open(start, end);
        traversal::walk(self.root.as_ref(), &range, Order::Descending, &mut visitor)
    }

    /// Visits the entries between two explicit bounds in ascending order.
    ///
    /// Each bound is independently inclusive, exclusive or absent. The
    /// half-open walk of [`iterate`](Self::iterate) corresponds to
    /// `(Bound::Included(start), Bound::Excluded(end))`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::{PersistentAvlTree, Visit};
    /// use std::ops::Bound;
    ///
    /// let tree: PersistentAvlTree<()> = ["A", "B", "C", "D"]
    ///     .into_iter()
    ///     .map(|key| (key, ()))
    ///     .collect();
    ///
    /// let mut keys = Vec::new();
    /// tree.traverse_in_range(Bound::Excluded("A"), Bound::Included("C"), |key, _| {
    ///     keys.push(key.to_string());
    ///     Visit::Continue
    /// });
    /// assert_eq!(keys, vec!["B", "C"]);
    /// ```
    pub fn traverse_in_range<F>(
        &self,
        start: Bound<&str>,
        end: Bound<&str>,
        mut visitor: F,
    ) -> Visit
    where
        F: FnMut(&str, &V) -> Visit,
    {
        let range = KeyRange::new(start, end);
        traversal::walk(self.root.as_ref(), &range, Order::Ascending, &mut visitor)
    }

    /// Visits up to `limit` consecutive entries starting at zero-based
    /// position `offset` of the sorted sequence.
    ///
    /// The sequence is ascending or descending according to `order`. The
    /// first entry is located through the subtree sizes in O(log N), then
    /// successors are followed, so deep pages cost the same as the first.
    ///
    /// `policy` decides what happens when the window runs past the end:
    /// [`OffsetPolicy::Clamp`] visits the part that exists, while
    /// [`OffsetPolicy::Strict`] rejects the call.
    ///
    /// # Errors
    ///
    /// With [`OffsetPolicy::Strict`], returns [`AvlError::WindowOutOfRange`]
    /// if `offset + limit > self.len()`. Nothing is visited in that case.
    /// [`OffsetPolicy::Clamp`] never fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::{OffsetPolicy, Order, PersistentAvlTree, Visit};
    ///
    /// let tree: PersistentAvlTree<()> = ["A", "B", "C", "D", "E"]
    ///     .into_iter()
    ///     .map(|key| (key, ()))
    ///     .collect();
    ///
    /// let mut page = Vec::new();
    /// tree.traverse_by_offset(1, 2, Order::Descending, OffsetPolicy::Clamp, |key, _| {
    ///     page.push(key.to_string());
    ///     Visit::Continue
    /// })
    /// .unwrap();
    /// assert_eq!(page, vec!["D", "C"]);
    /// ```
    pub fn traverse_by_offset<F>(
        &self,
        offset: usize,
        limit: usize,
        order: Order,
        policy: OffsetPolicy,
        mut visitor: F,
    ) -> AvlResult<Visit>
    where
        F: FnMut(&str, &V) -> Visit,
    {
        let len = self.len();
        match policy {
            OffsetPolicy::Strict => {
                let fits = offset.checked_add(limit).is_some_and(|end| end <= len);
                if !fits {
                    tracing::debug!(offset, limit, len, "page window out of range");
                    return Err(AvlError::WindowOutOfRange { offset, limit, len });
                }
            }
            OffsetPolicy::Clamp => {
                if offset >= len && limit > 0 {
                    tracing::trace!(offset, len, "page offset past the end");
                }
            }
        }
        Ok(traversal::paginate(
            self.root.as_ref(),
            offset,
            limit,
            order,
            &mut visitor,
        ))
    }

    /// Returns an iterator over entries in ascending key order.
    ///
    /// The iterator is lazy; it keeps an ancestor stack of O(log N) nodes.
    #[must_use]
    pub fn iter(&self) -> PersistentAvlTreeIterator<'_, V> {
        PersistentAvlTreeIterator {
            cursor: Cursor::seek(self.root.as_ref(), 0, Order::Ascending),
            remaining: self.len(),
        }
    }

    /// Returns an iterator over keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in ascending key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Checks the ordering, balance, height and size invariants of every
    /// node.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found. A tree produced by
    /// this crate's operations always passes.
    pub fn verify_invariants(&self) -> Result<(), InvariantViolation> {
        node::verify(self.root.as_ref())
    }
}

impl<V: Clone> PersistentAvlTree<V> {
    /// Creates a tree containing a single entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::PersistentAvlTree;
    ///
    /// let tree = PersistentAvlTree::singleton("answer", 42);
    /// assert_eq!(tree.len(), 1);
    /// assert_eq!(tree.get("answer").value, Some(&42));
    /// ```
    #[must_use]
    pub fn singleton(key: &str, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Inserts or updates an entry, returning the new version and whether
    /// the key was already present.
    ///
    /// Only the nodes on the path to `key` are rebuilt; the rest of the
    /// tree is shared with `self`, which stays unchanged.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::PersistentAvlTree;
    ///
    /// let (v1, existed) = PersistentAvlTree::new().set("k", 1);
    /// assert!(!existed);
    /// let (v2, existed) = v1.set("k", 2);
    /// assert!(existed);
    ///
    /// assert_eq!(v1.get("k").value, Some(&1)); // Original unchanged
    /// assert_eq!(v2.get("k").value, Some(&2)); // New version
    /// ```
    #[must_use]
    pub fn set(&self, key: &str, value: V) -> (Self, bool) {
        let (root, existed) = mutation::insert(self.root.as_ref(), key, value);
        let tree = Self { root: Some(root) };
        tracing::trace!(key, existed, len = tree.len(), "set");
        (tree, existed)
    }

    /// Inserts or updates an entry, returning only the new version.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::PersistentAvlTree;
    ///
    /// let tree = PersistentAvlTree::new().insert("a", 1).insert("a", 10);
    /// assert_eq!(tree.len(), 1);
    /// assert_eq!(tree.get("a").value, Some(&10));
    /// ```
    #[inline]
    #[must_use]
    pub fn insert(&self, key: &str, value: V) -> Self {
        self.set(key, value).0
    }

    /// Removes an entry, returning the new version and the removed entry.
    ///
    /// When `key` is absent the returned version is `self` itself (see
    /// [`ptr_eq`](Self::ptr_eq)) and the removed entry is `None`. A node
    /// with two children is replaced by its in-order successor.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::PersistentAvlTree;
    ///
    /// let tree = PersistentAvlTree::new().insert("a", 1).insert("b", 2);
    /// let (smaller, removed) = tree.remove("a");
    ///
    /// assert_eq!(removed, Some(("a".to_string(), 1)));
    /// assert_eq!(tree.len(), 2);    // Original unchanged
    /// assert_eq!(smaller.len(), 1); // New version
    /// ```
    #[must_use]
    pub fn remove(&self, key: &str) -> (Self, Option<(String, V)>) {
        let outcome = self
            .root
            .as_ref()
            .and_then(|root| mutation::remove(root, key));
        let Some((root, (removed_key, value))) = outcome else {
            tracing::trace!(key, removed = false, len = self.len(), "remove");
            return (self.clone(), None);
        };
        let tree = Self { root };
        tracing::trace!(key, removed = true, len = tree.len(), "remove");
        (tree, Some((removed_key.to_string(), value)))
    }

    /// Removes an entry, returning only the new version.
    #[inline]
    #[must_use]
    pub fn without(&self, key: &str) -> Self {
        self.remove(key).0
    }

    /// Removes the entry with the smallest key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_avl::PersistentAvlTree;
    ///
    /// let tree = PersistentAvlTree::new().insert("b", 2).insert("a", 1);
    /// let (rest, first) = tree.remove_first();
    /// assert_eq!(first, Some(("a".to_string(), 1)));
    /// assert_eq!(rest.len(), 1);
    /// ```
    #[must_use]
    pub fn remove_first(&self) -> (Self, Option<(String, V)>) {
        self.root.as_ref().map_or_else(
            || (Self::new(), None),
            |root| {
                let (root, (key, value)) = mutation::extract_min(root);
                (Self { root }, Some((key.to_string(), value)))
            },
        )
    }

    /// Removes the entry with the largest key.
    #[must_use]
    pub fn remove_last(&self) -> (Self, Option<(String, V)>) {
        self.root.as_ref().map_or_else(
            || (Self::new(), None),
            |root| {
                let (root, (key, value)) = mutation::extract_max(root);
                (Self { root }, Some((key.to_string(), value)))
            },
        )
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the entries of a [`PersistentAvlTree`] in ascending key
/// order.
pub struct PersistentAvlTreeIterator<'a, V> {
    cursor: Cursor<'a, V>,
    remaining: usize,
}

impl<'a, V> Iterator for PersistentAvlTreeIterator<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cursor.next()?;
        self.remaining -= 1;
        Some((&*node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for PersistentAvlTreeIterator<'_, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<V> FusedIterator for PersistentAvlTreeIterator<'_, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<V> Default for PersistentAvlTree<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AsRef<str>, V: Clone> FromIterator<(S, V)> for PersistentAvlTree<V> {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |tree, (key, value)| tree.insert(key.as_ref(), value))
    }
}

impl<'a, V> IntoIterator for &'a PersistentAvlTree<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = PersistentAvlTreeIterator<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: PartialEq> PartialEq for PersistentAvlTree<V> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.len() == other.len() && self.iter().eq(other.iter()))
    }
}

impl<V: Eq> Eq for PersistentAvlTree<V> {}

/// Hashes the length followed by every entry in key order, so trees with
/// the same entries hash alike regardless of their shape.
impl<V: Hash> Hash for PersistentAvlTree<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for PersistentAvlTree<V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<V: fmt::Display> fmt::Display for PersistentAvlTree<V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Tests
// =============================================================================
