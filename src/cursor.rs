//! Positions and iterators over a tree, moved forward through parent links.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::node::{self, Link};
use crate::tree::Balance;

/// A position in a tree: either an entry or the past-the-end sentinel.
///
/// Obtained from [`Tree::begin`], [`Tree::end`] or [`Tree::find`].
/// A cursor borrows the tree, so the tree cannot change while it is alive.
///
/// [`Tree::begin`]: crate::Tree::begin
/// [`Tree::end`]: crate::Tree::end
/// [`Tree::find`]: crate::Tree::find
pub struct Cursor<'a, K, V, B: Balance> {
    node: Link<K, V, B::Meta>,
    marker: PhantomData<(&'a K, &'a V, B)>,
}

impl<'a, K, V, B: Balance> Cursor<'a, K, V, B> {
    pub(crate) fn new(node: Link<K, V, B::Meta>) -> Self {
        Self {
            node,
            marker: PhantomData,
        }
    }

    /// Returns true if the cursor is past the largest key.
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    pub fn key(&self) -> Option<&'a K> {
        self.key_value().map(|(key, _)| key)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.key_value().map(|(_, value)| value)
    }

    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.node.map(|node_ptr| {
            let node = unsafe { &*node_ptr.as_ptr() };
            (&node.key, &node.value)
        })
    }

    /// Moves to the entry with the next larger key, or to the end.
    /// Does nothing at the end.
    pub fn move_next(&mut self) {
        if let Some(node_ptr) = self.node {
            self.node = node::successor(node_ptr);
        }
    }

    /// Iterates from this position to the end.
    pub fn iter(&self) -> Iter<'a, K, V, B> {
        Iter { cursor: *self }
    }
}

impl<'a, K, V, B: Balance> Clone for Cursor<'a, K, V, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V, B: Balance> Copy for Cursor<'a, K, V, B> {}

impl<'a, K, V, B: Balance> PartialEq for Cursor<'a, K, V, B> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<'a, K, V, B: Balance> Eq for Cursor<'a, K, V, B> {}

impl<'a, K: fmt::Debug, V: fmt::Debug, B: Balance> fmt::Debug for Cursor<'a, K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key_value() {
            Some(kv) => f.debug_tuple("Cursor").field(&kv).finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}

impl<'a, K, V, B: Balance> IntoIterator for Cursor<'a, K, V, B> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, B>;

    fn into_iter(self) -> Self::IntoIter {
        Iter { cursor: self }
    }
}

/// An iterator over the entries of a tree, in ascending key order.
pub struct Iter<'a, K, V, B: Balance> {
    cursor: Cursor<'a, K, V, B>,
}

impl<'a, K, V, B: Balance> Iterator for Iter<'a, K, V, B> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let kv = self.cursor.key_value()?;
        self.cursor.move_next();
        Some(kv)
    }
}

impl<'a, K, V, B: Balance> FusedIterator for Iter<'a, K, V, B> {}

impl<'a, K, V, B: Balance> Clone for Iter<'a, K, V, B> {
    fn clone(&self) -> Self {
        Iter {
            cursor: self.cursor,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, B: Balance> fmt::Debug for Iter<'_, K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// A mutable iterator over the entries of a tree, in ascending key order.
pub struct IterMut<'a, K, V, B: Balance> {
    node: Link<K, V, B::Meta>,
    marker: PhantomData<(&'a K, &'a mut V, B)>,
}

impl<'a, K, V, B: Balance> IterMut<'a, K, V, B> {
    pub(crate) fn new(node: Link<K, V, B::Meta>) -> Self {
        Self {
            node,
            marker: PhantomData,
        }
    }
}

impl<'a, K, V, B: Balance> Iterator for IterMut<'a, K, V, B> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let node_ptr = self.node?;
        self.node = node::successor(node_ptr);
        // Each node is handed out once, so the mutable borrows never overlap.
        let node = unsafe { &mut *node_ptr.as_ptr() };
        Some((&node.key, &mut node.value))
    }
}

impl<'a, K, V, B: Balance> FusedIterator for IterMut<'a, K, V, B> {}
