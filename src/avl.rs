//! Height-balanced (AVL) strategy.

use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::mem;
use std::ptr::NonNull;

use log::{debug, trace};

use crate::error::TreeError;
use crate::node::{self, Link, Node, NodePtr};
use crate::tree::{sealed, Balance, Tree};

/// Balancing by subtree height: sibling subtrees differ in height by at most one.
#[derive(Debug)]
pub enum Avl {}

/// An ordered map implemented with an AVL tree.
///
/// ```
/// use ordtree::AvlTree;
/// let mut map = AvlTree::new();
/// map.insert(0, "zero");
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.get(&1), Some(&"one"));
/// map.remove(&1).unwrap();
/// assert!(map.get(&1).is_none());
/// ```
pub type AvlTree<K, V> = Tree<K, V, Avl>;

type AvlPtr<K, V> = NodePtr<K, V, usize>;
type AvlLink<K, V> = Link<K, V, usize>;
type LinkPtr<K, V> = NonNull<AvlLink<K, V>>;

impl sealed::Sealed for Avl {}

impl Balance for Avl {
    /// Height of the subtree rooted at the node; a leaf has height 1.
    type Meta = usize;

    fn insert<K: Ord, V>(tree: &mut Tree<K, V, Self>, key: K, value: V) -> Option<V> {
        match find_insert_pos(tree, &key) {
            Err(mut node_ptr) => {
                let old_value = unsafe { mem::replace(&mut node_ptr.as_mut().value, value) };
                Some(old_value)
            }
            Ok((parent, mut link_ptr)) => {
                unsafe {
                    *link_ptr.as_mut() = Some(Node::create(parent, key, value, 1));
                }
                tree.num_nodes += 1;
                rebalance(tree, parent);
                None
            }
        }
    }

    fn remove<K, V, Q>(tree: &mut Tree<K, V, Self>, key: &Q) -> Result<V, TreeError>
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let mut node_ptr = match node::search(tree.root, key) {
            Some(node_ptr) => node_ptr,
            None => {
                debug!("avl remove: key not found");
                return Err(TreeError::KeyNotFound);
            }
        };

        unsafe {
            // A node with two children takes over its successor's payload,
            // the successor (no left child) is then unlinked instead.
            if let (Some(_), Some(right_ptr)) = (node_ptr.as_ref().left, node_ptr.as_ref().right) {
                let mut succ_ptr = node::leftmost(right_ptr);
                mem::swap(&mut node_ptr.as_mut().key, &mut succ_ptr.as_mut().key);
                mem::swap(&mut node_ptr.as_mut().value, &mut succ_ptr.as_mut().value);
                node_ptr = succ_ptr;
            }
        }

        debug_assert!(tree.num_nodes >= 1);
        let parent = unlink_node(tree, node_ptr);
        let (_, value) = unsafe { Node::destroy(node_ptr) };
        tree.num_nodes -= 1;
        rebalance(tree, parent);
        Ok(value)
    }

    fn validate<K: Ord, V>(tree: &Tree<K, V, Self>) -> Result<(), TreeError> {
        let mut error = None;
        node::preorder(tree.root, |node_ptr| {
            if error.is_some() {
                return;
            }
            let (left_height, right_height) = (left_height(node_ptr), right_height(node_ptr));
            let height = unsafe { node_ptr.as_ref().meta };
            if height != 1 + cmp::max(left_height, right_height) {
                let msg = format!(
                    "stored height {} with subtree heights {} and {}",
                    height, left_height, right_height
                );
                error = Some(TreeError::InvariantViolation(msg));
            } else if left_height > right_height + 1 || right_height > left_height + 1 {
                let msg = format!("unbalanced: left {} right {}", left_height, right_height);
                error = Some(TreeError::InvariantViolation(msg));
            }
        });
        match error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn height<K, V>(tree: &Tree<K, V, Self>) -> usize {
        height_of(tree.root)
    }
}

/// Finds the empty slot where `key` belongs, with the parent that owns it.
/// Fails with the node holding `key` if it is already present.
fn find_insert_pos<K: Ord, V>(
    tree: &mut Tree<K, V, Avl>,
    key: &K,
) -> Result<(AvlLink<K, V>, LinkPtr<K, V>), AvlPtr<K, V>> {
    let mut parent: AvlLink<K, V> = None;
    let mut link_ptr: LinkPtr<K, V> = NonNull::from(&mut tree.root);
    unsafe {
        while let Some(mut node_ptr) = *link_ptr.as_ref() {
            link_ptr = match key.cmp(&node_ptr.as_ref().key) {
                Ordering::Equal => return Err(node_ptr),
                Ordering::Less => NonNull::from(&mut node_ptr.as_mut().left),
                Ordering::Greater => NonNull::from(&mut node_ptr.as_mut().right),
            };
            parent = Some(node_ptr);
        }
    }
    Ok((parent, link_ptr))
}

/// Splices out a node with at most one child by promoting that child.
/// Returns the former parent, where rebalancing has to start.
fn unlink_node<K, V>(tree: &mut Tree<K, V, Avl>, node_ptr: AvlPtr<K, V>) -> AvlLink<K, V> {
    unsafe {
        let node = node_ptr.as_ref();
        debug_assert!(node.left.is_none() || node.right.is_none());
        let child = node.left.or(node.right);
        if let Some(mut child_ptr) = child {
            child_ptr.as_mut().parent = node.parent;
        }
        // Without a parent the node is the root and the child becomes the new root.
        node::replace_child(&mut tree.root, node.parent, node_ptr, child);
        node.parent
    }
}

fn height_of<K, V>(link: AvlLink<K, V>) -> usize {
    match link {
        None => 0,
        Some(node_ptr) => unsafe { node_ptr.as_ref().meta },
    }
}

fn left_height<K, V>(node_ptr: AvlPtr<K, V>) -> usize {
    height_of(unsafe { node_ptr.as_ref().left })
}

fn right_height<K, V>(node_ptr: AvlPtr<K, V>) -> usize {
    height_of(unsafe { node_ptr.as_ref().right })
}

fn balance_factor<K, V>(node_ptr: AvlPtr<K, V>) -> isize {
    left_height(node_ptr) as isize - right_height(node_ptr) as isize
}

fn adjust_height<K, V>(mut node_ptr: AvlPtr<K, V>) {
    let height = 1 + cmp::max(left_height(node_ptr), right_height(node_ptr));
    unsafe { node_ptr.as_mut().meta = height };
}

//      node                right
//      /  \                /   \
//     a   right    ->    node   c
//         /   \          /  \
//        b     c        a    b
//
fn rotate_left<K, V>(tree: &mut Tree<K, V, Avl>, mut node_ptr: AvlPtr<K, V>) {
    unsafe {
        let Some(mut right_ptr) = node_ptr.as_ref().right else {
            unreachable!("rotate_left without a right child");
        };
        trace!("avl rotate left, height {}", node_ptr.as_ref().meta);

        node_ptr.as_mut().right = right_ptr.as_ref().left;
        if let Some(mut right_left_ptr) = right_ptr.as_ref().left {
            right_left_ptr.as_mut().parent = Some(node_ptr);
        }

        let parent = node_ptr.as_ref().parent;
        right_ptr.as_mut().parent = parent;
        node::replace_child(&mut tree.root, parent, node_ptr, Some(right_ptr));

        right_ptr.as_mut().left = Some(node_ptr);
        node_ptr.as_mut().parent = Some(right_ptr);

        adjust_height(node_ptr);
        adjust_height(right_ptr);
    }
}

//        node            left
//        /  \            /  \
//      left  c    ->    a   node
//      /  \                 /  \
//     a    b               b    c
//
fn rotate_right<K, V>(tree: &mut Tree<K, V, Avl>, mut node_ptr: AvlPtr<K, V>) {
    unsafe {
        let Some(mut left_ptr) = node_ptr.as_ref().left else {
            unreachable!("rotate_right without a left child");
        };
        trace!("avl rotate right, height {}", node_ptr.as_ref().meta);

        node_ptr.as_mut().left = left_ptr.as_ref().right;
        if let Some(mut left_right_ptr) = left_ptr.as_ref().right {
            left_right_ptr.as_mut().parent = Some(node_ptr);
        }

        let parent = node_ptr.as_ref().parent;
        left_ptr.as_mut().parent = parent;
        node::replace_child(&mut tree.root, parent, node_ptr, Some(left_ptr));

        left_ptr.as_mut().right = Some(node_ptr);
        node_ptr.as_mut().parent = Some(left_ptr);

        adjust_height(node_ptr);
        adjust_height(left_ptr);
    }
}

/// Rebalances nodes starting from given position up to the root node.
fn rebalance<K, V>(tree: &mut Tree<K, V, Avl>, start_from: AvlLink<K, V>) {
    let mut current = start_from;
    while let Some(node_ptr) = current {
        let parent = unsafe { node_ptr.as_ref().parent };
        rebalance_node(tree, node_ptr);
        current = parent;
    }
}

/// Restores the AVL condition at given node if necessary and adjusts its height.
/// Initial balance must not exceed +2 or -2, which always holds after a single update.
fn rebalance_node<K, V>(tree: &mut Tree<K, V, Avl>, node_ptr: AvlPtr<K, V>) {
    let balance = balance_factor(node_ptr);
    debug_assert!((-2..=2).contains(&balance));
    if balance > 1 {
        let left = unsafe { node_ptr.as_ref().left };
        let Some(left_ptr) = left else {
            unreachable!("left-heavy node without a left child");
        };
        if balance_factor(left_ptr) < 0 {
            rotate_left(tree, left_ptr);
        }
        rotate_right(tree, node_ptr);
    } else if balance < -1 {
        let right = unsafe { node_ptr.as_ref().right };
        let Some(right_ptr) = right else {
            unreachable!("right-heavy node without a right child");
        };
        if balance_factor(right_ptr) > 0 {
            rotate_right(tree, right_ptr);
        }
        rotate_left(tree, node_ptr);
    } else {
        adjust_height(node_ptr);
    }
}
