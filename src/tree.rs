use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

use log::debug;

use crate::cursor::{Cursor, Iter, IterMut};
use crate::error::TreeError;
use crate::node::{self, Link, Node};

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// A self-balancing strategy for [`Tree`].
///
/// Implemented by [`Avl`](crate::Avl) and [`RedBlack`](crate::RedBlack) only.
pub trait Balance: sealed::Sealed + Sized {
    /// Balancing state stored in every node.
    type Meta;

    #[doc(hidden)]
    fn insert<K: Ord, V>(tree: &mut Tree<K, V, Self>, key: K, value: V) -> Option<V>;

    #[doc(hidden)]
    fn remove<K, V, Q>(tree: &mut Tree<K, V, Self>, key: &Q) -> Result<V, TreeError>
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized;

    #[doc(hidden)]
    fn validate<K: Ord, V>(tree: &Tree<K, V, Self>) -> Result<(), TreeError>;

    #[doc(hidden)]
    fn height<K, V>(tree: &Tree<K, V, Self>) -> usize;
}

/// An ordered map over a binary search tree kept balanced by `B`.
///
/// Use the [`AvlTree`](crate::AvlTree) and [`RbTree`](crate::RbTree) aliases.
///
/// ```
/// use ordtree::AvlTree;
/// let mut map = AvlTree::new();
/// map.insert(2, "two");
/// map.insert(1, "one");
/// assert_eq!(map.get(&1), Some(&"one"));
/// assert!(map.remove(&1).is_ok());
/// assert!(map.find(&1).is_err());
/// ```
pub struct Tree<K, V, B: Balance> {
    pub(crate) root: Link<K, V, B::Meta>,
    pub(crate) num_nodes: usize,
    marker: PhantomData<(B, Box<Node<K, V, B::Meta>>)>,
}

impl<K, V, B: Balance> Tree<K, V, B> {
    /// Creates an empty map.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
            marker: PhantomData,
        }
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    /// An empty tree has height 0.
    pub fn height(&self) -> usize {
        B::height(self)
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        if self.num_nodes > 0 {
            debug!("clearing {} nodes", self.num_nodes);
        }
        node::postorder(self.root, |node_ptr| unsafe {
            Node::destroy(node_ptr);
        });
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns a cursor at the smallest key, or the end cursor if empty.
    pub fn begin(&self) -> Cursor<'_, K, V, B> {
        Cursor::new(self.root.map(node::leftmost))
    }

    /// Returns the past-the-end cursor.
    pub fn end(&self) -> Cursor<'_, K, V, B> {
        Cursor::new(None)
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V, B> {
        self.begin().into_iter()
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, B> {
        IterMut::new(self.root.map(node::leftmost))
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Returns the entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.begin().key_value()
    }

    /// Returns the entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        Cursor::<K, V, B>::new(self.root.map(node::rightmost)).key_value()
    }
}

impl<K: Ord, V, B: Balance> Tree<K, V, B> {
    /// Inserts a key-value pair into the map.
    ///
    /// If the key was present its value is replaced in place and the old
    /// value returned. The number of entries does not change in that case.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let old_value = B::insert(self, key, value);
        self.after_mutation();
        old_value
    }

    /// Removes a key from the map, returning its value.
    /// Fails with [`TreeError::KeyNotFound`] and leaves the map untouched
    /// if the key is absent.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let value = B::remove(self, key)?;
        self.after_mutation();
        Ok(value)
    }

    /// Returns a cursor positioned at `key`.
    pub fn find<Q>(&self, key: &Q) -> Result<Cursor<'_, K, V, B>, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match node::search(self.root, key) {
            Some(node_ptr) => Ok(Cursor::new(Some(node_ptr))),
            None => Err(TreeError::KeyNotFound),
        }
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).ok().and_then(|cursor| cursor.value())
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        node::search(self.root, key).map(|node_ptr| unsafe { &mut (*node_ptr.as_ptr()).value })
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).ok().and_then(|cursor| cursor.key_value())
    }

    /// Returns true if the map contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        node::search(self.root, key).is_some()
    }

    /// Checks every structural invariant: key order, parent links, entry
    /// count and the balancing rules of `B`.
    pub fn validate(&self) -> Result<(), TreeError> {
        if let Some(root_ptr) = self.root {
            if unsafe { root_ptr.as_ref().parent.is_some() } {
                return Err(TreeError::InvariantViolation("root has a parent".into()));
            }
        }

        let mut num_nodes = 0;
        let mut error = None;
        node::preorder(self.root, |node_ptr| unsafe {
            num_nodes += 1;
            let node = node_ptr.as_ref();
            for child_ptr in [node.left, node.right].into_iter().flatten() {
                if error.is_none() && child_ptr.as_ref().parent != Some(node_ptr) {
                    error = Some(TreeError::InvariantViolation(
                        "child does not link back to its parent".into(),
                    ));
                }
            }
        });
        if let Some(err) = error {
            return Err(err);
        }
        if num_nodes != self.num_nodes {
            let msg = format!("counted {} nodes, expected {}", num_nodes, self.num_nodes);
            return Err(TreeError::InvariantViolation(msg));
        }

        let mut keys = self.keys();
        if let Some(mut prev) = keys.next() {
            for key in keys {
                if prev >= key {
                    return Err(TreeError::InvariantViolation("keys out of order".into()));
                }
                prev = key;
            }
        }

        B::validate(self)
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        if let Err(err) = self.validate() {
            panic!("{}", err);
        }
    }

    #[inline]
    fn after_mutation(&self) {
        #[cfg(feature = "consistency_check")]
        self.check_consistency();
    }
}

impl<K, V, B: Balance> Drop for Tree<K, V, B> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V, B: Balance> Default for Tree<K, V, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone, B: Balance> Clone for Tree<K, V, B> {
    fn clone(&self) -> Self {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, B: Balance> fmt::Debug for Tree<K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, B: Balance> PartialEq for Tree<K, V, B> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, B: Balance> Eq for Tree<K, V, B> {}

impl<K, V, B, Q> Index<&Q> for Tree<K, V, B>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
    B: Balance,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, B: Balance> FromIterator<(K, V)> for Tree<K, V, B> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V, B: Balance> Extend<(K, V)> for Tree<K, V, B> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, B: Balance> IntoIterator for &'a Tree<K, V, B> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, B: Balance> IntoIterator for &'a mut Tree<K, V, B> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
