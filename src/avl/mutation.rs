//! Persistent insertion and removal by path copying.
//!
//! Each function rebuilds the nodes on the path from the given root to the
//! affected position and rebalances them on the way back up. Every subtree
//! off that path is shared with the input version.

use super::ReferenceCounter;
use super::node::{Link, Node};
use super::rotation::balance;
use std::cmp::Ordering;

/// A key/value pair taken out of a tree.
pub(crate) type Entry<V> = (ReferenceCounter<str>, V);

/// Inserts or replaces `key`, returning the new subtree and whether the key
/// was already present.
pub(crate) fn insert<V: Clone>(
    node: Option<&ReferenceCounter<Node<V>>>,
    key: &str,
    value: V,
) -> (ReferenceCounter<Node<V>>, bool) {
    let Some(node) = node else {
        return (ReferenceCounter::new(Node::leaf(key, value)), false);
    };

    match key.cmp(&*node.key) {
        Ordering::Less => {
            let (new_left, existed) = insert(node.left.as_ref(), key, value);
            let rebuilt = node.with_children(Some(new_left), node.right.clone());
            (ReferenceCounter::new(balance(rebuilt)), existed)
        }
        Ordering::Greater => {
            let (new_right, existed) = insert(node.right.as_ref(), key, value);
            let rebuilt = node.with_children(node.left.clone(), Some(new_right));
            (ReferenceCounter::new(balance(rebuilt)), existed)
        }
        Ordering::Equal => {
            // Same shape, so no rebalancing is needed.
            let replaced = Node::new(
                node.key.clone(),
                value,
                node.left.clone(),
                node.right.clone(),
            );
            (ReferenceCounter::new(replaced), true)
        }
    }
}

/// Removes `key` from the subtree.
///
/// Returns `None` when the key is absent, leaving the caller free to keep
/// the original subtree untouched. Otherwise returns the new subtree and the
/// removed entry.
pub(crate) fn remove<V: Clone>(
    node: &ReferenceCounter<Node<V>>,
    key: &str,
) -> Option<(Link<V>, Entry<V>)> {
    match key.cmp(&*node.key) {
        Ordering::Less => {
            let (new_left, removed) = remove(node.left.as_ref()?, key)?;
            let rebuilt = node.with_children(new_left, node.right.clone());
            Some((Some(ReferenceCounter::new(balance(rebuilt))), removed))
        }
        Ordering::Greater => {
            let (new_right, removed) = remove(node.right.as_ref()?, key)?;
            let rebuilt = node.with_children(node.left.clone(), new_right);
            Some((Some(ReferenceCounter::new(balance(rebuilt))), removed))
        }
        Ordering::Equal => {
            let removed = (node.key.clone(), node.value.clone());
            Some((splice(node), removed))
        }
    }
}

/// Replaces `node` by its subtree without it.
///
/// With two children the in-order successor takes its place.
fn splice<V: Clone>(node: &ReferenceCounter<Node<V>>) -> Link<V> {
    match (&node.left, &node.right) {
        (None, None) => None,
        (Some(child), None) | (None, Some(child)) => Some(child.clone()),
        (Some(left), Some(right)) => {
            let (rest, (key, value)) = extract_min(right);
            let successor = Node::new(key, value, Some(left.clone()), rest);
            Some(ReferenceCounter::new(balance(successor)))
        }
    }
}

/// Detaches the entry with the smallest key.
pub(crate) fn extract_min<V: Clone>(node: &ReferenceCounter<Node<V>>) -> (Link<V>, Entry<V>) {
    match &node.left {
        None => (
            node.right.clone(),
            (node.key.clone(), node.value.clone()),
        ),
        Some(left) => {
            let (new_left, min) = extract_min(left);
            let rebuilt = node.with_children(new_left, node.right.clone());
            (Some(ReferenceCounter::new(balance(rebuilt))), min)
        }
    }
}

/// Detaches the entry with the largest key.
pub(crate) fn extract_max<V: Clone>(node: &ReferenceCounter<Node<V>>) -> (Link<V>, Entry<V>) {
    match &node.right {
        None => (
            node.left.clone(),
            (node.key.clone(), node.value.clone()),
        ),
        Some(right) => {
            let (new_right, max) = extract_max(right);
            let rebuilt = node.with_children(node.left.clone(), new_right);
            (Some(ReferenceCounter::new(balance(rebuilt))), max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avl::node::verify;
    use rstest::rstest;

    fn build(keys: &[&str]) -> Link<usize> {
        keys.iter()
            .enumerate()
            .fold(None, |root: Link<usize>, (index, key)| {
                Some(insert(root.as_ref(), key, index).0)
            })
    }

    fn keys_in_order(node: Option<&ReferenceCounter<Node<usize>>>) -> Vec<String> {
        let mut keys = Vec::new();
        let mut stack = Vec::new();
        let mut current = node;
        while current.is_some() || !stack.is_empty() {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_ref();
            }
            if let Some(node) = stack.pop() {
                keys.push(node.key.to_string());
                current = node.right.as_ref();
            }
        }
        keys
    }

    #[rstest]
    fn test_insert_into_empty_creates_leaf() {
        let (root, existed) = insert(None, "A", 1);
        assert!(!existed);
        assert_eq!(root.size(), 1);
        assert_eq!(root.height(), 1);
    }

    #[rstest]
    fn test_insert_existing_key_replaces_value() {
        let root = build(&["B", "A", "C"]);
        let (updated, existed) = insert(root.as_ref(), "A", 99);
        assert!(existed);
        assert_eq!(updated.size(), 3);
        let left_value = updated.left.as_ref().map(|left| left.value);
        assert_eq!(left_value, Some(99));
    }

    #[rstest]
    fn test_insert_shares_untouched_subtree() {
        let root = build(&["B", "A", "C"]);
        let original_left = root.as_ref().and_then(|root| root.left.clone());
        let (updated, _) = insert(root.as_ref(), "D", 3);
        let shared_left = updated.left.clone();
        match (original_left, shared_left) {
            (Some(original), Some(shared)) => {
                assert!(ReferenceCounter::ptr_eq(&original, &shared));
            }
            _ => panic!("both versions should have a left subtree"),
        }
    }

    #[rstest]
    fn test_ascending_inserts_stay_balanced() {
        let keys: Vec<String> = (0..64).map(|index| format!("{index:03}")).collect();
        let root = keys.iter().fold(None, |root: Link<usize>, key| {
            Some(insert(root.as_ref(), key, 0).0)
        });
        assert_eq!(verify(root.as_ref()), Ok(()));
        assert_eq!(root.as_ref().map(|root| root.height()), Some(7));
    }

    #[rstest]
    #[case::leaf(&["C", "A", "B", "D"], "B", &["A", "C", "D"])]
    #[case::one_child(&["C", "A", "B", "D"], "A", &["B", "C", "D"])]
    #[case::two_children(&["C", "A", "B", "E", "D"], "C", &["A", "B", "D", "E"])]
    #[case::root(&["B", "A", "C"], "B", &["A", "C"])]
    fn test_remove_splices_node(
        #[case] keys: &[&str],
        #[case] target: &str,
        #[case] expected: &[&str],
    ) {
        let root = build(keys);
        let Some(root_ref) = root.as_ref() else {
            panic!("tree should not be empty");
        };
        let Some((new_root, (removed_key, _))) = remove(root_ref, target) else {
            panic!("key should be present");
        };
        assert_eq!(&*removed_key, target);
        assert_eq!(keys_in_order(new_root.as_ref()), expected);
        assert_eq!(verify(new_root.as_ref()), Ok(()));
    }

    #[rstest]
    fn test_remove_missing_key_returns_none() {
        let root = build(&["C", "A", "B", "E", "D"]);
        let Some(root_ref) = root.as_ref() else {
            panic!("tree should not be empty");
        };
        assert!(remove(root_ref, "F").is_none());
        assert!(remove(root_ref, "BB").is_none());
    }

    #[rstest]
    fn test_remove_only_entry_leaves_empty_tree() {
        let (root, _) = insert(None, "A", 7);
        let Some((new_root, (_, value))) = remove(&root, "A") else {
            panic!("key should be present");
        };
        assert!(new_root.is_none());
        assert_eq!(value, 7);
    }

    #[rstest]
    fn test_extract_min_and_max() {
        let root = build(&["D", "B", "F", "A", "C", "E", "G"]);
        let Some(root_ref) = root.as_ref() else {
            panic!("tree should not be empty");
        };
        let (without_min, (min_key, _)) = extract_min(root_ref);
        assert_eq!(&*min_key, "A");
        assert_eq!(verify(without_min.as_ref()), Ok(()));
        let (without_max, (max_key, _)) = extract_max(root_ref);
        assert_eq!(&*max_key, "G");
        assert_eq!(
            keys_in_order(without_max.as_ref()),
            vec!["A", "B", "C", "D", "E", "F"]
        );
    }

    #[rstest]
    fn test_draining_by_min_keeps_invariants() {
        let keys: Vec<String> = (0..40).map(|index| format!("k{index:02}")).collect();
        let mut root = keys.iter().fold(None, |root: Link<usize>, key| {
            Some(insert(root.as_ref(), key, 0).0)
        });
        let mut drained = Vec::new();
        while let Some(node) = root {
            let (rest, (key, _)) = extract_min(&node);
            assert_eq!(verify(rest.as_ref()), Ok(()));
            drained.push(key.to_string());
            root = rest;
        }
        assert_eq!(drained, keys);
    }
}
