//! Node shape and parent-link primitives shared by both balancing strategies.
//!
//! Child links own their node (leaked from a `Box` on creation), parent links
//! are plain back-references. Every function here relies on parent links
//! agreeing with child slots; the balancing code keeps them in sync.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::ptr::NonNull;

pub(crate) type NodePtr<K, V, M> = NonNull<Node<K, V, M>>;
pub(crate) type Link<K, V, M> = Option<NodePtr<K, V, M>>;

/// A tree node. `meta` carries the per-strategy balancing state:
/// the subtree height for AVL, the link color for red-black.
pub(crate) struct Node<K, V, M> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link<K, V, M>,
    pub(crate) right: Link<K, V, M>,
    pub(crate) parent: Link<K, V, M>,
    pub(crate) meta: M,
}

impl<K, V, M> Node<K, V, M> {
    pub(crate) fn create(parent: Link<K, V, M>, key: K, value: V, meta: M) -> NodePtr<K, V, M> {
        let boxed = Box::new(Node {
            key,
            value,
            left: None,
            right: None,
            parent,
            meta,
        });
        NonNull::from(Box::leak(boxed))
    }

    /// Frees a node and hands back its payload.
    ///
    /// The node must already be unlinked: nothing may point at it afterwards.
    pub(crate) unsafe fn destroy(node_ptr: NodePtr<K, V, M>) -> (K, V) {
        let Node { key, value, .. } = *Box::from_raw(node_ptr.as_ptr());
        (key, value)
    }
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

/// Binary search for `key` below `root`.
pub(crate) fn search<K, V, M, Q>(root: Link<K, V, M>, key: &Q) -> Link<K, V, M>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut current = root;
    while let Some(node_ptr) = current {
        current = unsafe {
            match key.cmp(node_ptr.as_ref().key.borrow()) {
                Ordering::Equal => break,
                Ordering::Less => node_ptr.as_ref().left,
                Ordering::Greater => node_ptr.as_ref().right,
            }
        }
    }
    current
}

pub(crate) fn leftmost<K, V, M>(mut node_ptr: NodePtr<K, V, M>) -> NodePtr<K, V, M> {
    while let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
        node_ptr = left_ptr;
    }
    node_ptr
}

pub(crate) fn rightmost<K, V, M>(mut node_ptr: NodePtr<K, V, M>) -> NodePtr<K, V, M> {
    while let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
        node_ptr = right_ptr;
    }
    node_ptr
}

/// In-order successor, found through parent links only.
/// Returns `None` past the largest key.
pub(crate) fn successor<K, V, M>(node_ptr: NodePtr<K, V, M>) -> Link<K, V, M> {
    unsafe {
        if let Some(right_ptr) = node_ptr.as_ref().right {
            return Some(leftmost(right_ptr));
        }
        // Climb until we come up from a left child.
        let mut child_ptr = node_ptr;
        while let Some(parent_ptr) = child_ptr.as_ref().parent {
            if parent_ptr.as_ref().left == Some(child_ptr) {
                return Some(parent_ptr);
            }
            child_ptr = parent_ptr;
        }
        None
    }
}

/// Points the slot that owned `old_ptr` at `new`: the left or right link of
/// `parent`, or `root` when `parent` is `None`.
/// Does not touch `new`'s parent link.
pub(crate) unsafe fn replace_child<K, V, M>(
    root: &mut Link<K, V, M>,
    parent: Link<K, V, M>,
    old_ptr: NodePtr<K, V, M>,
    new: Link<K, V, M>,
) {
    match parent {
        None => *root = new,
        Some(mut parent_ptr) => {
            if parent_ptr.as_ref().left == Some(old_ptr) {
                parent_ptr.as_mut().left = new;
            } else {
                debug_assert!(parent_ptr.as_ref().right == Some(old_ptr));
                parent_ptr.as_mut().right = new;
            }
        }
    }
}

pub(crate) fn preorder<K, V, M, F>(root: Link<K, V, M>, f: F)
where
    F: FnMut(NodePtr<K, V, M>),
{
    traverse(root, f, |_| {}, |_| {});
}

pub(crate) fn postorder<K, V, M, F>(root: Link<K, V, M>, f: F)
where
    F: FnMut(NodePtr<K, V, M>),
{
    traverse(root, |_| {}, |_| {}, f);
}

/// Depth-first walk driven by parent links, no stack.
pub(crate) fn traverse<K, V, M, Pre, In, Post>(
    root: Link<K, V, M>,
    mut preorder: Pre,
    mut inorder: In,
    mut postorder: Post,
) where
    Pre: FnMut(NodePtr<K, V, M>),
    In: FnMut(NodePtr<K, V, M>),
    Post: FnMut(NodePtr<K, V, M>),
{
    if let Some(mut node_ptr) = root {
        let mut dir = Direction::FromParent;
        loop {
            match dir {
                Direction::FromParent => {
                    preorder(node_ptr);
                    if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                        node_ptr = left_ptr;
                    } else {
                        dir = Direction::FromLeft;
                    }
                }
                Direction::FromLeft => {
                    inorder(node_ptr);
                    if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                        node_ptr = right_ptr;
                        dir = Direction::FromParent;
                    } else {
                        dir = Direction::FromRight;
                    }
                }
                Direction::FromRight => {
                    // Post order is used for node deletion,
                    // so the node pointer is dead after the postorder call.
                    // The walk never climbs above `root`, even for a subtree.
                    let parent = unsafe { node_ptr.as_ref().parent };
                    match parent {
                        Some(parent_ptr) if Some(node_ptr) != root => {
                            if Some(node_ptr) == unsafe { parent_ptr.as_ref().left } {
                                dir = Direction::FromLeft;
                            } else {
                                dir = Direction::FromRight;
                            }
                            postorder(node_ptr);
                            node_ptr = parent_ptr;
                        }
                        _ => {
                            postorder(node_ptr);
                            break;
                        }
                    }
                }
            }
        }
    }
}
