//! Left-leaning red-black (LLRB) strategy.
//!
//! Insert and remove are recursive and return the new root of the subtree
//! they worked on; the caller links it back in with [`set_left`] /
//! [`set_right`], which also re-point the parent link. Recursion depth is
//! bounded by the tree height, which the LLRB rules keep logarithmic.

use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::mem;

use log::{debug, trace};

use crate::error::TreeError;
use crate::node::{self, Link, Node, NodePtr};
use crate::tree::{sealed, Balance, Tree};

/// Balancing by link color, red links leaning left only.
#[derive(Debug)]
pub enum RedBlack {}

/// An ordered map implemented with a left-leaning red-black tree.
///
/// ```
/// use ordtree::RbTree;
/// let mut map = RbTree::new();
/// for key in [10, 20, 30] {
///     map.insert(key, key * 2);
/// }
/// assert_eq!(map[&20], 40);
/// assert_eq!(map.remove(&10), Ok(20));
/// assert!(map.validate().is_ok());
/// ```
pub type RbTree<K, V> = Tree<K, V, RedBlack>;

/// Color of the link from a node's parent to the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    fn flip(self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

type RbPtr<K, V> = NodePtr<K, V, Color>;
type RbLink<K, V> = Link<K, V, Color>;

impl sealed::Sealed for RedBlack {}

impl Balance for RedBlack {
    type Meta = Color;

    fn insert<K: Ord, V>(tree: &mut Tree<K, V, Self>, key: K, value: V) -> Option<V> {
        let (mut root_ptr, old_value) = insert_at(tree.root, None, key, value);
        unsafe {
            root_ptr.as_mut().meta = Color::Black;
            root_ptr.as_mut().parent = None;
        }
        tree.root = Some(root_ptr);
        if old_value.is_none() {
            tree.num_nodes += 1;
        }
        old_value
    }

    fn remove<K, V, Q>(tree: &mut Tree<K, V, Self>, key: &Q) -> Result<V, TreeError>
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        // delete_at relies on the key being present, so check first.
        let mut root_ptr = match (tree.root, node::search(tree.root, key)) {
            (Some(root_ptr), Some(_)) => root_ptr,
            _ => {
                debug!("llrb remove: key not found");
                return Err(TreeError::KeyNotFound);
            }
        };

        unsafe {
            let root = root_ptr.as_mut();
            if !is_red(root.left) && !is_red(root.right) {
                root.meta = Color::Red;
            }
        }

        let (root, value) = delete_at(root_ptr, key);
        if let Some(mut root_ptr) = root {
            unsafe {
                root_ptr.as_mut().meta = Color::Black;
                root_ptr.as_mut().parent = None;
            }
        }
        tree.root = root;
        tree.num_nodes -= 1;
        Ok(value)
    }

    fn validate<K: Ord, V>(tree: &Tree<K, V, Self>) -> Result<(), TreeError> {
        if is_red(tree.root) {
            return Err(TreeError::InvariantViolation("red root".into()));
        }
        black_height(tree.root, false).map(|_| ())
    }

    fn height<K, V>(tree: &Tree<K, V, Self>) -> usize {
        depth(tree.root)
    }
}

fn insert_at<K: Ord, V>(
    link: RbLink<K, V>,
    parent: RbLink<K, V>,
    key: K,
    value: V,
) -> (RbPtr<K, V>, Option<V>) {
    let mut node_ptr = match link {
        None => return (Node::create(parent, key, value, Color::Red), None),
        Some(node_ptr) => node_ptr,
    };

    let old_value = unsafe {
        match key.cmp(&node_ptr.as_ref().key) {
            Ordering::Less => {
                let left = node_ptr.as_ref().left;
                let (left_ptr, old_value) = insert_at(left, Some(node_ptr), key, value);
                set_left(node_ptr, Some(left_ptr));
                old_value
            }
            Ordering::Greater => {
                let right = node_ptr.as_ref().right;
                let (right_ptr, old_value) = insert_at(right, Some(node_ptr), key, value);
                set_right(node_ptr, Some(right_ptr));
                old_value
            }
            Ordering::Equal => {
                let old_value = mem::replace(&mut node_ptr.as_mut().value, value);
                return (node_ptr, Some(old_value));
            }
        }
    };
    (insert_fixup(node_ptr), old_value)
}

/// Removes `key` from the subtree at `node_ptr`. The key must be present.
/// Red links are pushed down on the way so the node finally unlinked is red.
fn delete_at<K, V, Q>(mut node_ptr: RbPtr<K, V>, key: &Q) -> (RbLink<K, V>, V)
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let value = unsafe {
        if key.cmp(node_ptr.as_ref().key.borrow()) == Ordering::Less {
            let left = node_ptr.as_ref().left;
            if !is_red(left) && !is_red(left_of(left)) {
                node_ptr = move_red_left(node_ptr);
            }
            let Some(left_ptr) = node_ptr.as_ref().left else {
                unreachable!("key below a node without left subtree");
            };
            let (left, value) = delete_at(left_ptr, key);
            set_left(node_ptr, left);
            value
        } else {
            if is_red(node_ptr.as_ref().left) {
                node_ptr = rotate_right(node_ptr);
            }
            let is_match = key.cmp(node_ptr.as_ref().key.borrow()) == Ordering::Equal;
            if is_match && node_ptr.as_ref().right.is_none() {
                debug_assert!(node_ptr.as_ref().left.is_none());
                let (_, value) = Node::destroy(node_ptr);
                return (None, value);
            }
            let right = node_ptr.as_ref().right;
            if !is_red(right) && !is_red(left_of(right)) {
                node_ptr = move_red_right(node_ptr);
            }
            let Some(right_ptr) = node_ptr.as_ref().right else {
                unreachable!("key above a node without right subtree");
            };
            if key.cmp(node_ptr.as_ref().key.borrow()) == Ordering::Equal {
                // Relabel with the successor, then drop the successor's node.
                let (right, (succ_key, succ_value)) = delete_min(right_ptr);
                set_right(node_ptr, right);
                let node = node_ptr.as_mut();
                node.key = succ_key;
                mem::replace(&mut node.value, succ_value)
            } else {
                let (right, value) = delete_at(right_ptr, key);
                set_right(node_ptr, right);
                value
            }
        }
    };
    (Some(delete_fixup(node_ptr)), value)
}

fn delete_min<K, V>(mut node_ptr: RbPtr<K, V>) -> (RbLink<K, V>, (K, V)) {
    unsafe {
        let left = node_ptr.as_ref().left;
        if left.is_none() {
            debug_assert!(node_ptr.as_ref().right.is_none());
            return (None, Node::destroy(node_ptr));
        }
        if !is_red(left) && !is_red(left_of(left)) {
            node_ptr = move_red_left(node_ptr);
        }
        let Some(left_ptr) = node_ptr.as_ref().left else {
            unreachable!("move_red_left dropped the left subtree");
        };
        let (left, entry) = delete_min(left_ptr);
        set_left(node_ptr, left);
        (Some(delete_fixup(node_ptr)), entry)
    }
}

fn is_red<K, V>(link: RbLink<K, V>) -> bool {
    let color = link.map(|node_ptr| unsafe { node_ptr.as_ref().meta });
    color == Some(Color::Red)
}

fn left_of<K, V>(link: RbLink<K, V>) -> RbLink<K, V> {
    link.and_then(|node_ptr| unsafe { node_ptr.as_ref().left })
}

fn set_left<K, V>(mut node_ptr: RbPtr<K, V>, child: RbLink<K, V>) {
    unsafe {
        node_ptr.as_mut().left = child;
        if let Some(mut child_ptr) = child {
            child_ptr.as_mut().parent = Some(node_ptr);
        }
    }
}

fn set_right<K, V>(mut node_ptr: RbPtr<K, V>, child: RbLink<K, V>) {
    unsafe {
        node_ptr.as_mut().right = child;
        if let Some(mut child_ptr) = child {
            child_ptr.as_mut().parent = Some(node_ptr);
        }
    }
}

/// Repairs a subtree root on the way up after an insert: lean red links
/// left, split temporary 4-nodes.
fn insert_fixup<K, V>(mut node_ptr: RbPtr<K, V>) -> RbPtr<K, V> {
    unsafe {
        if is_red(node_ptr.as_ref().right) && !is_red(node_ptr.as_ref().left) {
            node_ptr = rotate_left(node_ptr);
        }
        rotate_and_flip(node_ptr)
    }
}

/// Repairs a subtree root on the way up after a delete. Any red right link
/// is rotated, even under a red left link: the push-down can leave both
/// children red with a red left grandchild.
fn delete_fixup<K, V>(mut node_ptr: RbPtr<K, V>) -> RbPtr<K, V> {
    if is_red(unsafe { node_ptr.as_ref().right }) {
        node_ptr = rotate_left(node_ptr);
    }
    rotate_and_flip(node_ptr)
}

fn rotate_and_flip<K, V>(mut node_ptr: RbPtr<K, V>) -> RbPtr<K, V> {
    unsafe {
        let left = node_ptr.as_ref().left;
        if is_red(left) && is_red(left_of(left)) {
            node_ptr = rotate_right(node_ptr);
        }
        if is_red(node_ptr.as_ref().left) && is_red(node_ptr.as_ref().right) {
            flip_colors(node_ptr);
        }
    }
    node_ptr
}

//              (i)                       (i)
//               |                         |
//              node                       x
//              /  \                      / \
//             /    (r)                 (r)  \
//            /       \                 /     \
//          left       x             node      xr
//                    / \            /  \
//                  xl   xr       left   xl
//
fn rotate_left<K, V>(mut node_ptr: RbPtr<K, V>) -> RbPtr<K, V> {
    unsafe {
        let Some(mut x_ptr) = node_ptr.as_ref().right else {
            unreachable!("rotate_left without a right child");
        };
        debug_assert!(x_ptr.as_ref().meta == Color::Red, "rotating a black link");
        trace!("llrb rotate left");

        set_right(node_ptr, x_ptr.as_ref().left);
        x_ptr.as_mut().parent = node_ptr.as_ref().parent;
        set_left(x_ptr, Some(node_ptr));
        x_ptr.as_mut().meta = node_ptr.as_ref().meta;
        node_ptr.as_mut().meta = Color::Red;
        x_ptr
    }
}

//              (i)                       (i)
//               |                         |
//              node                       x
//              /  \                      / \
//            (r)   \                   (r)  \
//           /       \                 /      \
//          x       right             xl      node
//         / \                                / \
//       xl   xr                             xr  right
//
fn rotate_right<K, V>(mut node_ptr: RbPtr<K, V>) -> RbPtr<K, V> {
    unsafe {
        let Some(mut x_ptr) = node_ptr.as_ref().left else {
            unreachable!("rotate_right without a left child");
        };
        debug_assert!(x_ptr.as_ref().meta == Color::Red, "rotating a black link");
        trace!("llrb rotate right");

        set_left(node_ptr, x_ptr.as_ref().right);
        x_ptr.as_mut().parent = node_ptr.as_ref().parent;
        set_right(x_ptr, Some(node_ptr));
        x_ptr.as_mut().meta = node_ptr.as_ref().meta;
        node_ptr.as_mut().meta = Color::Red;
        x_ptr
    }
}

//        (x)                   (!x)
//         |                     |
//        node                  node
//        / \                   / \
//      (y) (z)              (!y) (!z)
//     /      \              /      \
//   left    right         left    right
//
fn flip_colors<K, V>(mut node_ptr: RbPtr<K, V>) {
    unsafe {
        let (Some(mut left_ptr), Some(mut right_ptr)) =
            (node_ptr.as_ref().left, node_ptr.as_ref().right)
        else {
            unreachable!("flip_colors needs two children");
        };
        trace!("llrb flip colors");
        node_ptr.as_mut().meta = node_ptr.as_ref().meta.flip();
        left_ptr.as_mut().meta = left_ptr.as_ref().meta.flip();
        right_ptr.as_mut().meta = right_ptr.as_ref().meta.flip();
    }
}

fn move_red_left<K, V>(mut node_ptr: RbPtr<K, V>) -> RbPtr<K, V> {
    flip_colors(node_ptr);
    unsafe {
        if let Some(right_ptr) = node_ptr.as_ref().right {
            if is_red(right_ptr.as_ref().left) {
                set_right(node_ptr, Some(rotate_right(right_ptr)));
                node_ptr = rotate_left(node_ptr);
                flip_colors(node_ptr);
            }
        }
    }
    node_ptr
}

fn move_red_right<K, V>(mut node_ptr: RbPtr<K, V>) -> RbPtr<K, V> {
    flip_colors(node_ptr);
    let left = unsafe { node_ptr.as_ref().left };
    if is_red(left_of(left)) {
        node_ptr = rotate_right(node_ptr);
        flip_colors(node_ptr);
    }
    node_ptr
}

/// Number of black nodes on every path from `link` down to an empty slot.
fn black_height<K, V>(link: RbLink<K, V>, parent_red: bool) -> Result<usize, TreeError> {
    let node_ptr = match link {
        None => return Ok(0),
        Some(node_ptr) => node_ptr,
    };
    let node = unsafe { node_ptr.as_ref() };
    let red = node.meta == Color::Red;
    if red && parent_red {
        return Err(TreeError::InvariantViolation("double red link".into()));
    }
    if is_red(node.right) {
        return Err(TreeError::InvariantViolation("red link leans right".into()));
    }
    let left = black_height(node.left, red)?;
    let right = black_height(node.right, red)?;
    if left != right {
        let msg = format!("black heights differ: {} and {}", left, right);
        return Err(TreeError::InvariantViolation(msg));
    }
    Ok(left + usize::from(!red))
}

fn depth<K, V>(link: RbLink<K, V>) -> usize {
    match link {
        None => 0,
        Some(node_ptr) => {
            let node = unsafe { node_ptr.as_ref() };
            1 + cmp::max(depth(node.left), depth(node.right))
        }
    }
}
