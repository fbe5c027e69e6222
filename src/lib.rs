//! Ordered maps over self-balancing binary search trees.
//!
//! Two balancing strategies share one map type, [`Tree`]:
//!
//! * [`AvlTree`] keeps sibling subtree heights within one of each other.
//! * [`RbTree`] is a left-leaning red-black tree.
//!
//! Nodes keep a back-link to their parent, so cursors and iterators walk the
//! tree in key order without any auxiliary stack.
//!
//! ```
//! use ordtree::{AvlTree, RbTree, TreeError};
//!
//! let mut avl = AvlTree::new();
//! let mut rb = RbTree::new();
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     avl.insert(key, key * 10);
//!     rb.insert(key, key * 10);
//! }
//! assert!(avl.keys().eq(rb.keys()));
//!
//! let mut cursor = avl.find(&4).unwrap();
//! cursor.move_next();
//! assert_eq!(cursor.key(), Some(&5));
//!
//! assert_eq!(rb.remove(&2), Err(TreeError::KeyNotFound));
//! ```

mod avl;
mod cursor;
mod error;
mod node;
mod rb;
mod tree;

pub use avl::{Avl, AvlTree};
pub use cursor::{Cursor, Iter, IterMut};
pub use error::TreeError;
pub use rb::{Color, RbTree, RedBlack};
pub use tree::{Balance, Tree};

#[cfg(test)]
mod tests;
