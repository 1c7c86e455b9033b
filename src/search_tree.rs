//! The interface shared by every balanced tree.

use crate::error::TreeError;

/// An ordered map kept in a leaf-oriented binary search tree.
///
/// Implemented by [`AvlTree`](crate::AvlTree), [`BbTree`](crate::BbTree) and
/// [`RbTree`](crate::RbTree), so code can be written once against any discipline.
///
/// # Examples
///
/// ```
/// use leaf_tree::{AvlTree, BbTree, RbTree, SearchTree};
///
/// fn fill<T: SearchTree<u32, &'static str>>(tree: &mut T) {
///     tree.insert(2, "two");
///     tree.insert(1, "one");
///     tree.insert(2, "deux");
/// }
///
/// let mut avl = AvlTree::new();
/// let mut bb = BbTree::new();
/// let mut rb = RbTree::new();
/// fill(&mut avl);
/// fill(&mut bb);
/// fill(&mut rb);
/// for tree in [&avl as &dyn SearchTree<_, _>, &bb, &rb] {
///     assert_eq!(tree.find(&2), Some(&"deux"));
///     assert_eq!(tree.len(), 2);
/// }
/// assert!(rb.delete(&1).is_err());
/// assert_eq!(SearchTree::delete(&mut avl, &1), Ok(Some("one")));
/// ```
pub trait SearchTree<K, V> {
    /// Inserts a key-value pair, returning the previous value if the key was present.
    ///
    /// Overwriting an existing key never changes the shape of the tree.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Removes a key, returning its value if it was present.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`] if the tree cannot remove keys.
    fn delete(&mut self, key: &K) -> Result<Option<V>, TreeError>;

    /// Returns the value stored under `key`.
    fn find(&self, key: &K) -> Option<&V>;

    /// Returns the number of keys in the tree.
    fn len(&self) -> usize;

    /// Returns true if the tree holds no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
