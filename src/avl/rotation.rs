//! Rotations and the AVL rebalancing decision.
//!
//! All functions take the node being restructured by value and return the
//! new subtree root. Nodes reached through a child handle are shared with
//! other versions, so they are copied before being rebuilt.

use super::ReferenceCounter;
use super::node::{Node, height};

/// Rotates the subtree to the left around `node`.
///
/// The right child becomes the new root and `node` becomes its left child,
/// adopting the right child's former left subtree. Returns `node` unchanged
/// when it has no right child.
pub(crate) fn rotate_left<V: Clone>(node: Node<V>) -> Node<V> {
    if let Some(right) = node.right {
        let lowered = Node::new(node.key, node.value, node.left, right.left.clone());
        Node::new(
            right.key.clone(),
            right.value.clone(),
            Some(ReferenceCounter::new(lowered)),
            right.right.clone(),
        )
    } else {
        node
    }
}

/// Rotates the subtree to the right around `node`.
///
/// Mirror image of [`rotate_left`].
pub(crate) fn rotate_right<V: Clone>(node: Node<V>) -> Node<V> {
    if let Some(left) = node.left {
        let lowered = Node::new(node.key, node.value, left.right.clone(), node.right);
        Node::new(
            left.key.clone(),
            left.value.clone(),
            left.left.clone(),
            Some(ReferenceCounter::new(lowered)),
        )
    } else {
        node
    }
}

/// Restores the AVL invariant at `node`.
///
/// Both children must already be balanced and differ in height by at most
/// two, which holds for every node on the path of a single insertion or
/// removal.
pub(crate) fn balance<V: Clone>(node: Node<V>) -> Node<V> {
    let factor = node.balance_factor();

    if factor > 1 {
        // Left-right case: straighten the left child first.
        let zigzag = node
            .left
            .as_ref()
            .is_some_and(|left| height(left.right.as_ref()) > height(left.left.as_ref()));
        let node = if zigzag {
            let left = node
                .left
                .as_ref()
                .map(|left| ReferenceCounter::new(rotate_left((**left).clone())));
            node.with_left(left)
        } else {
            node
        };
        return rotate_right(node);
    }

    if factor < -1 {
        // Right-left case: straighten the right child first.
        let zigzag = node
            .right
            .as_ref()
            .is_some_and(|right| height(right.left.as_ref()) > height(right.right.as_ref()));
        let node = if zigzag {
            let right = node
                .right
                .as_ref()
                .map(|right| ReferenceCounter::new(rotate_right((**right).clone())));
            node.with_right(right)
        } else {
            node
        };
        return rotate_left(node);
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avl::node::{Link, verify};
    use rstest::rstest;

    fn shared(node: Node<()>) -> Link<()> {
        Some(ReferenceCounter::new(node))
    }

    fn branch(key: &str, left: Link<()>, right: Link<()>) -> Node<()> {
        Node::new(ReferenceCounter::from(key), (), left, right)
    }

    fn leaf(key: &str) -> Link<()> {
        shared(Node::leaf(key, ()))
    }

    fn keys_in_order(node: Option<&ReferenceCounter<Node<()>>>, keys: &mut Vec<String>) {
        if let Some(node) = node {
            keys_in_order(node.left.as_ref(), keys);
            keys.push(node.key.to_string());
            keys_in_order(node.right.as_ref(), keys);
        }
    }

    fn collect(node: Node<()>) -> (String, Vec<String>, Link<()>) {
        let root_key = node.key.to_string();
        let root = shared(node);
        let mut keys = Vec::new();
        keys_in_order(root.as_ref(), &mut keys);
        (root_key, keys, root)
    }

    #[rstest]
    fn test_rotate_left_promotes_right_child() {
        // A -> B -> C chain leaning right.
        let node = branch("A", None, shared(branch("B", None, leaf("C"))));
        let (root_key, keys, root) = collect(rotate_left(node));
        assert_eq!(root_key, "B");
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(verify(root.as_ref()), Ok(()));
    }

    #[rstest]
    fn test_rotate_right_promotes_left_child() {
        let node = branch("C", shared(branch("B", leaf("A"), None)), None);
        let (root_key, keys, root) = collect(rotate_right(node));
        assert_eq!(root_key, "B");
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(verify(root.as_ref()), Ok(()));
    }

    #[rstest]
    fn test_rotate_without_child_is_identity() {
        let node = branch("A", None, None);
        let rotated = rotate_right(rotate_left(node));
        assert_eq!(&*rotated.key, "A");
        assert_eq!(rotated.size(), 1);
    }

    #[rstest]
    fn test_rotate_left_moves_inner_grandchild() {
        // C's left child must end up as A's right child.
        let node = branch(
            "A",
            None,
            shared(branch("C", leaf("B"), leaf("D"))),
        );
        let rotated = rotate_left(node);
        assert_eq!(&*rotated.key, "C");
        let lowered = rotated.left.as_ref().map(|left| left.key.to_string());
        assert_eq!(lowered.as_deref(), Some("A"));
        let moved = rotated
            .left
            .as_ref()
            .and_then(|left| left.right.as_ref())
            .map(|node| node.key.to_string());
        assert_eq!(moved.as_deref(), Some("B"));
        assert_eq!(rotated.size(), 4);
    }

    #[rstest]
    #[case::left_left(branch("C", shared(branch("B", leaf("A"), None)), None))]
    #[case::left_right(branch("C", shared(branch("A", None, leaf("B"))), None))]
    #[case::right_right(branch("A", None, shared(branch("B", None, leaf("C")))))]
    #[case::right_left(branch("A", None, shared(branch("C", leaf("B"), None))))]
    fn test_balance_restores_all_four_cases(#[case] node: Node<()>) {
        let (root_key, keys, root) = collect(balance(node));
        assert_eq!(root_key, "B");
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(verify(root.as_ref()), Ok(()));
    }

    #[rstest]
    fn test_balance_leaves_balanced_node_alone() {
        let node = branch("B", leaf("A"), None);
        let balanced = balance(node);
        assert_eq!(&*balanced.key, "B");
        assert_eq!(balanced.height(), 2);
    }

    #[rstest]
    fn test_balance_does_not_touch_shared_children() {
        let shared_left = shared(branch("B", leaf("A"), None));
        let node = branch("C", shared_left.clone(), None);
        let _balanced = balance(node);
        let original = shared_left.as_ref().map(|left| left.key.to_string());
        assert_eq!(original.as_deref(), Some("B"));
        assert_eq!(shared_left.as_ref().map(|left| left.size()), Some(2));
    }
}
