use core::fmt;

use super::handle::Handle;

/// Per-discipline bookkeeping carried by every node.
///
/// Acts as the node factory of a balancing discipline: it decides what a fresh
/// leaf carries and what a fresh internal node derives from its two children.
pub(crate) trait Metadata: Copy + fmt::Debug {
    /// Metadata of a freshly created leaf.
    fn leaf() -> Self;

    /// Metadata of a freshly created internal node over `left` and `right`.
    fn internal(left: Self, right: Self) -> Self;
}

// Trees whose shape never changes carry no bookkeeping.
impl Metadata for () {
    fn leaf() -> Self {}

    fn internal((): Self, (): Self) -> Self {}
}

#[allow(clippy::large_enum_variant)]
#[derive(Clone)]
pub(crate) enum Node<K, V, M> {
    Internal(InternalNode<K, M>),
    Leaf(LeafNode<K, V, M>),
}

// Internal nodes only route searches. Their key is a separator: the minimum key
// of the right subtree.
#[derive(Clone)]
pub(crate) struct InternalNode<K, M> {
    key: K,
    left: Handle,
    right: Handle,
    parent: Option<Handle>,
    meta: M,
}

// Leaves hold the key/value pairs.
#[derive(Clone)]
pub(crate) struct LeafNode<K, V, M> {
    key: K,
    value: V,
    parent: Option<Handle>,
    meta: M,
}

impl<K, V, M: Copy> Node<K, V, M> {
    /// Returns true if this is a leaf node.
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode<K, V, M> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K, V, M> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node, panicking if this is not internal.
    pub(crate) fn as_internal(&self) -> &InternalNode<K, M> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K, M> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        match self {
            Node::Internal(internal) => &internal.key,
            Node::Leaf(leaf) => &leaf.key,
        }
    }

    #[inline]
    pub(crate) fn key_mut(&mut self) -> &mut K {
        match self {
            Node::Internal(internal) => &mut internal.key,
            Node::Leaf(leaf) => &mut leaf.key,
        }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        match self {
            Node::Internal(internal) => internal.parent,
            Node::Leaf(leaf) => leaf.parent,
        }
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        match self {
            Node::Internal(internal) => internal.parent = parent,
            Node::Leaf(leaf) => leaf.parent = parent,
        }
    }

    #[inline]
    pub(crate) fn meta(&self) -> M {
        match self {
            Node::Internal(internal) => internal.meta,
            Node::Leaf(leaf) => leaf.meta,
        }
    }

    #[inline]
    pub(crate) fn set_meta(&mut self, meta: M) {
        match self {
            Node::Internal(internal) => internal.meta = meta,
            Node::Leaf(leaf) => leaf.meta = meta,
        }
    }

    /// Returns `(left, right)` for an internal node, `None` for a leaf.
    #[inline]
    pub(crate) fn children(&self) -> Option<(Handle, Handle)> {
        match self {
            Node::Internal(internal) => Some((internal.left, internal.right)),
            Node::Leaf(_) => None,
        }
    }

    /// Shifts every handle stored in this node by `offset`.
    pub(crate) fn relocate(&mut self, offset: usize) {
        match self {
            Node::Internal(internal) => {
                internal.left = internal.left.offset(offset);
                internal.right = internal.right.offset(offset);
                internal.parent = internal.parent.map(|p| p.offset(offset));
            }
            Node::Leaf(leaf) => leaf.parent = leaf.parent.map(|p| p.offset(offset)),
        }
    }
}

impl<K, M> InternalNode<K, M> {
    pub(crate) fn new(key: K, left: Handle, right: Handle, meta: M) -> Self {
        Self {
            key,
            left,
            right,
            parent: None,
            meta,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn left(&self) -> Handle {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Handle {
        self.right
    }

    pub(crate) fn set_left(&mut self, child: Handle) {
        self.left = child;
    }

    pub(crate) fn set_right(&mut self, child: Handle) {
        self.right = child;
    }

    pub(crate) fn set_key(&mut self, key: K) -> K {
        core::mem::replace(&mut self.key, key)
    }

    pub(crate) fn into_key(self) -> K {
        self.key
    }
}

impl<K, V, M> LeafNode<K, V, M> {
    pub(crate) fn new(key: K, value: V, meta: M) -> Self {
        Self {
            key,
            value,
            parent: None,
            meta,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub(crate) fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}
