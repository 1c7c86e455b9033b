//! Read-only access to the shape of a tree.

use core::fmt;

use crate::raw::{Handle, Node, RawTree};

/// A borrowed view of one node of a tree.
///
/// Obtained from the `root` method of a tree and navigated through
/// [`left`](NodeRef::left), [`right`](NodeRef::right) and [`parent`](NodeRef::parent).
/// Internal nodes carry a separator key and no value; leaves carry both.
///
/// # Examples
///
/// ```
/// use leaf_tree::AvlTree;
///
/// let tree = AvlTree::from([(1, 'a'), (2, 'b')]);
/// let root = tree.root().unwrap();
/// assert!(!root.is_leaf());
/// assert_eq!(*root.key(), 2);
///
/// let (left, right) = root.children().unwrap();
/// assert_eq!(left.value(), Some(&'a'));
/// assert_eq!(right.parent(), Some(root));
/// ```
pub struct NodeRef<'a, K, V, M> {
    tree: &'a RawTree<K, V, M>,
    handle: Handle,
}

impl<'a, K, V, M: Copy> NodeRef<'a, K, V, M> {
    pub(crate) fn new(tree: &'a RawTree<K, V, M>, handle: Handle) -> Self {
        Self { tree, handle }
    }

    pub(crate) fn root(tree: &'a RawTree<K, V, M>) -> Option<Self> {
        tree.root().map(|handle| Self::new(tree, handle))
    }

    fn node(&self) -> &'a Node<K, V, M> {
        self.tree.node(self.handle)
    }

    /// The leaf key, or the separator of an internal node.
    pub fn key(&self) -> &'a K {
        self.node().key()
    }

    /// The value stored in a leaf. `None` for internal nodes.
    pub fn value(&self) -> Option<&'a V> {
        match self.node() {
            Node::Leaf(leaf) => Some(leaf.value()),
            Node::Internal(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    /// The balancing metadata of this node (height, weight or color).
    pub fn meta(&self) -> M {
        self.node().meta()
    }

    pub fn parent(&self) -> Option<Self> {
        self.node().parent().map(|handle| Self::new(self.tree, handle))
    }

    pub fn left(&self) -> Option<Self> {
        self.children().map(|(left, _)| left)
    }

    pub fn right(&self) -> Option<Self> {
        self.children().map(|(_, right)| right)
    }

    /// Both children of an internal node. `None` for leaves.
    pub fn children(&self) -> Option<(Self, Self)> {
        self.node()
            .children()
            .map(|(left, right)| (Self::new(self.tree, left), Self::new(self.tree, right)))
    }

    /// Number of edges on the longest path from this node down to a leaf.
    pub fn depth(&self) -> usize {
        self.tree.depth(self.handle)
    }

    /// Number of leaves in the subtree rooted at this node.
    pub fn size(&self) -> usize {
        match self.children() {
            Some((left, right)) => left.size() + right.size(),
            None => 1,
        }
    }

    /// An identifier unique among the live nodes of the tree.
    ///
    /// Rotations keep the identity of the node they are applied to, so the id of
    /// a subtree root is stable across rebalancing. Ids of removed nodes are reused.
    pub fn id(&self) -> usize {
        self.handle.to_index()
    }
}

impl<K, V, M> Clone for NodeRef<'_, K, V, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, M> Copy for NodeRef<'_, K, V, M> {}

impl<K, V, M> PartialEq for NodeRef<'_, K, V, M> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.tree, other.tree) && self.handle == other.handle
    }
}

impl<K, V, M> Eq for NodeRef<'_, K, V, M> {}

impl<K: fmt::Debug, V: fmt::Debug, M: Copy + fmt::Debug> fmt::Debug for NodeRef<'_, K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(if self.is_leaf() { "Leaf" } else { "Internal" });
        out.field("id", &self.id()).field("key", self.key());
        if let Some(value) = self.value() {
            out.field("value", value);
        }
        out.field("meta", &self.meta()).finish()
    }
}
