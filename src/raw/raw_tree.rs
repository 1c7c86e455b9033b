use core::cmp::Ordering;

use alloc::vec::Vec;
use log::{debug, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{InternalNode, LeafNode, Metadata, Node};
use crate::comparator::Comparator;

/// The leaf-oriented binary search tree shared by every balancing discipline.
///
/// Keys and values live in the leaves. Internal nodes carry a separator key equal to the
/// smallest key of their right subtree, so a search routes left iff `key < separator`.
/// Children are owned through the arena; parent links are plain handles.
#[derive(Clone)]
pub(crate) struct RawTree<K, V, M> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V, M>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Number of leaves (key-value pairs) in the tree.
    len: usize,
}

/// Result of placing a new leaf into the tree.
pub(crate) enum Inserted<V> {
    /// The key was already present; carries the replaced value.
    Replaced(V),
    /// The tree was empty and the new leaf became the root.
    Root,
    /// An existing leaf was split; carries the new internal node.
    Split(Handle),
}

/// Result of removing a leaf from the tree.
pub(crate) struct Removed<V> {
    /// The value stored under the removed key.
    pub(crate) value: V,
    /// The first ancestor whose subtree shrank, if any. Rebalancing resumes here.
    pub(crate) resume: Option<Handle>,
}

impl<K, V, M: Copy> RawTree<K, V, M> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Creates a new, empty tree with room for `capacity` keys.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            // n leaves need n - 1 internal nodes.
            nodes: Arena::with_capacity((2 * capacity).saturating_sub(1)),
            root: None,
            len: 0,
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears all elements from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns the number of live nodes, internal ones included.
    ///
    /// A tree that never freed a node indexes its handles densely below this count.
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the root handle, if any.
    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Makes `node` the root of the tree.
    pub(crate) fn set_root(&mut self, node: Option<Handle>) {
        if let Some(node) = node {
            self.nodes.get_mut(node).set_parent(None);
        }
        self.root = node;
    }

    /// Overrides the element count, for operations that assemble a tree from parts.
    pub(crate) fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    /// Returns a reference to a node by handle.
    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V, M> {
        self.nodes.get(handle)
    }

    /// Returns a mutable reference to a node by handle.
    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V, M> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.nodes.get(handle).key()
    }

    #[inline]
    pub(crate) fn parent(&self, handle: Handle) -> Option<Handle> {
        self.nodes.get(handle).parent()
    }

    #[inline]
    pub(crate) fn children(&self, handle: Handle) -> Option<(Handle, Handle)> {
        self.nodes.get(handle).children()
    }

    /// Returns the left child of an internal node.
    #[inline]
    pub(crate) fn left(&self, handle: Handle) -> Handle {
        self.nodes.get(handle).as_internal().left()
    }

    /// Returns the right child of an internal node.
    #[inline]
    pub(crate) fn right(&self, handle: Handle) -> Handle {
        self.nodes.get(handle).as_internal().right()
    }

    #[inline]
    pub(crate) fn meta(&self, handle: Handle) -> M {
        self.nodes.get(handle).meta()
    }

    #[inline]
    pub(crate) fn set_meta(&mut self, handle: Handle, meta: M) {
        self.nodes.get_mut(handle).set_meta(meta);
    }

    /// Recomputes the metadata of an internal node from its children. Leaves are left untouched.
    pub(crate) fn recompute_meta(&mut self, handle: Handle)
    where
        M: Metadata,
    {
        if let Some((left, right)) = self.children(handle) {
            let meta = M::internal(self.meta(left), self.meta(right));
            self.set_meta(handle, meta);
        }
    }

    /// Returns true if `child` is the left child of `parent`.
    #[inline]
    pub(crate) fn is_left_child(&self, parent: Handle, child: Handle) -> bool {
        self.left(parent) == child
    }

    fn connect_left(&mut self, parent: Handle, child: Handle) {
        self.nodes.get_mut(parent).as_internal_mut().set_left(child);
        self.nodes.get_mut(child).set_parent(Some(parent));
    }

    fn connect_right(&mut self, parent: Handle, child: Handle) {
        self.nodes.get_mut(parent).as_internal_mut().set_right(child);
        self.nodes.get_mut(child).set_parent(Some(parent));
    }

    /// Puts `new` into the slot of `parent` currently occupied by `old`, or makes it the root.
    pub(crate) fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Handle) {
        match parent {
            Some(parent) => {
                if self.is_left_child(parent, old) {
                    self.connect_left(parent, new);
                } else {
                    debug_assert_eq!(self.right(parent), old, "`old` is not a child of `parent`");
                    self.connect_right(parent, new);
                }
            }
            None => self.set_root(Some(new)),
        }
    }

    fn swap_keys(&mut self, a: Handle, b: Handle) {
        let (a, b) = self.nodes.pair_mut(a, b);
        core::mem::swap(a.key_mut(), b.key_mut());
    }

    /// Allocates a detached leaf.
    pub(crate) fn create_leaf(&mut self, key: K, value: V) -> Handle
    where
        M: Metadata,
    {
        self.nodes.alloc(Node::Leaf(LeafNode::new(key, value, M::leaf())))
    }

    /// Allocates an internal node over two detached subtrees.
    pub(crate) fn create_internal(&mut self, key: K, left: Handle, right: Handle) -> Handle
    where
        M: Metadata,
    {
        let meta = M::internal(self.meta(left), self.meta(right));
        let internal = self.nodes.alloc(Node::Internal(InternalNode::new(key, left, right, meta)));
        self.nodes.get_mut(left).set_parent(Some(internal));
        self.nodes.get_mut(right).set_parent(Some(internal));
        internal
    }

    /// Rotates the subtree at `node` to the left.
    ///
    /// `node` keeps its identity and its place under its parent; it takes over the key
    /// of its former right child, which moves down to become the new left child and
    /// receives the old key of `node`. In-order leaf sequence and separators are preserved.
    /// Does nothing unless `node` and its right child are both internal.
    ///
    /// The caller must refresh the metadata of `node` and of its new left child.
    pub(crate) fn left_rotation(&mut self, node: Handle) {
        let Some((left, right)) = self.children(node) else {
            return;
        };
        let Some((right_left, right_right)) = self.children(right) else {
            return;
        };
        trace!("left rotation at {node:?}");

        self.connect_right(node, right_right);
        self.connect_right(right, right_left);
        self.connect_left(right, left);
        self.connect_left(node, right);
        self.swap_keys(node, right);
    }

    /// Mirror image of [`left_rotation`](Self::left_rotation).
    ///
    /// The caller must refresh the metadata of `node` and of its new right child.
    pub(crate) fn right_rotation(&mut self, node: Handle) {
        let Some((left, right)) = self.children(node) else {
            return;
        };
        let Some((left_left, left_right)) = self.children(left) else {
            return;
        };
        trace!("right rotation at {node:?}");

        self.connect_left(node, left_left);
        self.connect_left(left, left_right);
        self.connect_right(left, right);
        self.connect_right(node, left);
        self.swap_keys(node, left);
    }

    /// Descends from `from` to the leaf where `key` is, or would be.
    pub(crate) fn narrow_to_leaf<C: Comparator<K>>(&self, key: &K, from: Handle, cmp: &C) -> Handle {
        let mut current = from;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = if cmp.is_lt(key, internal.key()) {
                internal.left()
            } else {
                internal.right()
            };
        }
        current
    }

    /// Replaces `old_leaf` with a new internal node whose children are `old_leaf` and `new_leaf`.
    ///
    /// The separator is the greater of the two keys. Returns the new internal node.
    ///
    /// # Panics
    ///
    /// Panics if both leaves carry the same key.
    pub(crate) fn split_leaf<C: Comparator<K>>(&mut self, old_leaf: Handle, new_leaf: Handle, cmp: &C) -> Handle
    where
        K: Clone,
        M: Metadata,
    {
        let parent = self.parent(old_leaf);
        let (lesser, greater) = match cmp.compare(self.key(old_leaf), self.key(new_leaf)) {
            Ordering::Less => (old_leaf, new_leaf),
            Ordering::Greater => (new_leaf, old_leaf),
            Ordering::Equal => panic!("`RawTree::split_leaf()` - duplicated key!"),
        };

        let separator = self.key(greater).clone();
        let internal = self.create_internal(separator, lesser, greater);
        self.replace_child(parent, old_leaf, internal);
        if parent.is_none() {
            debug!("root leaf split into {internal:?}");
        }
        internal
    }

    /// Removes the parent of `leaf`, promoting the sibling of `leaf` into its slot.
    ///
    /// `leaf` is left detached and must be taken by the caller. Returns the promoted sibling.
    ///
    /// # Panics
    ///
    /// Panics if `leaf` is the root.
    pub(crate) fn join_leaf(&mut self, leaf: Handle) -> Handle {
        let parent = self.parent(leaf).expect("`RawTree::join_leaf()` - leaf has no parent!");
        let (left, right) = self.children(parent).expect("parent must be internal");
        let grandparent = self.parent(parent);

        let (sibling, stale) = if left == leaf {
            // `leaf` held the smallest key under `parent`, so the nearest ancestor that
            // reaches `parent` through its right child routes on the key of `leaf`.
            let mut child = parent;
            let mut ancestor = grandparent;
            while let Some(node) = ancestor {
                if self.right(node) == child {
                    break;
                }
                child = node;
                ancestor = self.parent(node);
            }
            (right, ancestor)
        } else {
            (left, None)
        };

        self.replace_child(grandparent, parent, sibling);
        self.nodes.get_mut(leaf).set_parent(None);

        let Node::Internal(collapsed) = self.nodes.take(parent) else {
            unreachable!("parent of a leaf is internal")
        };
        if let Some(stale) = stale {
            // The collapsed separator is the smallest key of `sibling`.
            self.nodes.get_mut(stale).as_internal_mut().set_key(collapsed.into_key());
        }
        if grandparent.is_none() {
            debug!("root collapsed into {sibling:?}");
        }

        sibling
    }

    /// Frees a detached leaf, returning its contents.
    pub(crate) fn take_leaf(&mut self, leaf: Handle) -> (K, V) {
        match self.nodes.take(leaf) {
            Node::Leaf(leaf) => leaf.into_parts(),
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Frees an internal node, returning its separator and its children, which are left unlinked.
    pub(crate) fn take_internal(&mut self, node: Handle) -> (K, Handle, Handle) {
        let Node::Internal(internal) = self.nodes.take(node) else {
            panic!("expected internal node")
        };
        let (left, right) = (internal.left(), internal.right());
        self.nodes.get_mut(left).set_parent(None);
        self.nodes.get_mut(right).set_parent(None);
        (internal.into_key(), left, right)
    }

    /// Searches for a key and returns the leaf holding it.
    pub(crate) fn search<C: Comparator<K>>(&self, key: &K, cmp: &C) -> Option<Handle> {
        let leaf = self.narrow_to_leaf(key, self.root?, cmp);
        cmp.is_eq(self.key(leaf), key).then_some(leaf)
    }

    /// Returns a reference to the value corresponding to the key.
    pub(crate) fn get<C: Comparator<K>>(&self, key: &K, cmp: &C) -> Option<&V> {
        let leaf = self.search(key, cmp)?;
        Some(self.nodes.get(leaf).as_leaf().value())
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub(crate) fn get_mut<C: Comparator<K>>(&mut self, key: &K, cmp: &C) -> Option<&mut V> {
        let leaf = self.search(key, cmp)?;
        Some(self.nodes.get_mut(leaf).as_leaf_mut().value_mut())
    }

    /// Places a key-value pair into the tree without rebalancing.
    ///
    /// An existing key keeps its leaf and has its value replaced.
    pub(crate) fn insert_leaf<C: Comparator<K>>(&mut self, key: K, value: V, cmp: &C) -> Inserted<V>
    where
        K: Clone,
        M: Metadata,
    {
        let Some(root) = self.root else {
            let leaf = self.create_leaf(key, value);
            self.set_root(Some(leaf));
            self.len = 1;
            return Inserted::Root;
        };

        let old_leaf = self.narrow_to_leaf(&key, root, cmp);
        if cmp.is_eq(self.key(old_leaf), &key) {
            let slot = self.nodes.get_mut(old_leaf).as_leaf_mut().value_mut();
            return Inserted::Replaced(core::mem::replace(slot, value));
        }

        let new_leaf = self.create_leaf(key, value);
        let internal = self.split_leaf(old_leaf, new_leaf, cmp);
        self.len += 1;
        Inserted::Split(internal)
    }

    /// Removes a key from the tree without rebalancing.
    pub(crate) fn remove_leaf<C: Comparator<K>>(&mut self, key: &K, cmp: &C) -> Option<Removed<V>> {
        let leaf = self.search(key, cmp)?;
        let resume = if self.root == Some(leaf) {
            self.root = None;
            None
        } else {
            let sibling = self.join_leaf(leaf);
            self.parent(sibling)
        };

        self.len -= 1;
        let (_, value) = self.take_leaf(leaf);
        Some(Removed { value, resume })
    }

    /// Returns the leftmost leaf under `node`.
    pub(crate) fn first_leaf(&self, node: Handle) -> Handle {
        let mut current = node;
        while let Some((left, _)) = self.children(current) {
            current = left;
        }
        current
    }

    /// Returns the rightmost leaf under `node`.
    pub(crate) fn last_leaf(&self, node: Handle) -> Handle {
        let mut current = node;
        while let Some((_, right)) = self.children(current) {
            current = right;
        }
        current
    }

    /// Returns the leaf following `leaf` in key order.
    pub(crate) fn next_leaf(&self, leaf: Handle) -> Option<Handle> {
        let mut child = leaf;
        loop {
            let parent = self.parent(child)?;
            let (left, right) = self.children(parent)?;
            if left == child {
                return Some(self.first_leaf(right));
            }
            child = parent;
        }
    }

    /// Returns the leaf preceding `leaf` in key order.
    pub(crate) fn prev_leaf(&self, leaf: Handle) -> Option<Handle> {
        let mut child = leaf;
        loop {
            let parent = self.parent(child)?;
            let (left, right) = self.children(parent)?;
            if right == child {
                return Some(self.last_leaf(left));
            }
            child = parent;
        }
    }

    /// Returns the first and last leaf whose keys fall within `[min, max]`.
    pub(crate) fn leaf_range<C: Comparator<K>>(&self, min: &K, max: &K, cmp: &C) -> Option<(Handle, Handle)> {
        let root = self.root?;

        let mut first = self.narrow_to_leaf(min, root, cmp);
        if cmp.is_lt(self.key(first), min) {
            first = self.next_leaf(first)?;
        }
        let mut last = self.narrow_to_leaf(max, root, cmp);
        if cmp.is_lt(max, self.key(last)) {
            last = self.prev_leaf(last)?;
        }

        cmp.is_le(self.key(first), self.key(last)).then_some((first, last))
    }

    /// Returns the number of edges on the longest root-to-leaf path under `node`.
    pub(crate) fn depth(&self, node: Handle) -> usize {
        match self.children(node) {
            Some((left, right)) => 1 + self.depth(left).max(self.depth(right)),
            None => 0,
        }
    }

    /// Moves every node of `other` into this tree's arena.
    ///
    /// Returns the root of `other` as a handle valid in `self`. The nodes are not
    /// linked into this tree, and `len` is left unchanged.
    pub(crate) fn absorb(&mut self, other: RawTree<K, V, M>) -> Option<Handle> {
        let moved = other.nodes.len();
        let offset = self.nodes.absorb(other.nodes);
        let relocated: Vec<Handle> = self.nodes.occupied_from(offset).collect();
        for handle in relocated {
            self.nodes.get_mut(handle).relocate(offset);
        }
        trace!("absorbed {moved} nodes at offset {offset}");
        other.root.map(|root| root.offset(offset))
    }

    /// Moves the subtree rooted at `node` out of this tree into a fresh one.
    ///
    /// `node` must already be unlinked from its parent. The remaining tree's `len`
    /// is left unchanged.
    pub(crate) fn detach(&mut self, node: Handle) -> RawTree<K, V, M> {
        fn move_subtree<K, V, M: Copy>(
            from: &mut Arena<Node<K, V, M>>,
            into: &mut Arena<Node<K, V, M>>,
            handle: Handle,
        ) -> (Handle, usize) {
            let mut node = from.take(handle);
            node.set_parent(None);
            match node.children() {
                None => (into.alloc(node), 1),
                Some((left, right)) => {
                    let (new_left, left_len) = move_subtree(from, into, left);
                    let (new_right, right_len) = move_subtree(from, into, right);
                    let internal = node.as_internal_mut();
                    internal.set_left(new_left);
                    internal.set_right(new_right);
                    let new = into.alloc(node);
                    into.get_mut(new_left).set_parent(Some(new));
                    into.get_mut(new_right).set_parent(Some(new));
                    (new, left_len + right_len)
                }
            }
        }

        let mut tree = RawTree::new();
        let (root, len) = move_subtree(&mut self.nodes, &mut tree.nodes, node);
        tree.root = Some(root);
        tree.len = len;
        trace!("detached {len} leaves from {node:?}");
        tree
    }

    /// Iterates over the leaves in key order.
    pub(crate) fn leaves(&self) -> Leaves<'_, K, V, M> {
        match self.root {
            Some(root) => Leaves {
                tree: self,
                front: Some(self.first_leaf(root)),
                back: Some(self.last_leaf(root)),
            },
            None => Leaves {
                tree: self,
                front: None,
                back: None,
            },
        }
    }

    /// Iterates over the leaves between `first` and `last`, inclusive.
    pub(crate) fn leaves_between(&self, first: Handle, last: Handle) -> Leaves<'_, K, V, M> {
        Leaves {
            tree: self,
            front: Some(first),
            back: Some(last),
        }
    }
}

/// In-order iterator over the leaves of a [`RawTree`].
pub(crate) struct Leaves<'a, K, V, M> {
    tree: &'a RawTree<K, V, M>,
    front: Option<Handle>,
    back: Option<Handle>,
}

impl<K, V, M> Clone for Leaves<'_, K, V, M> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, K, V, M: Copy> Iterator for Leaves<'a, K, V, M> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.front?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.front = self.tree.next_leaf(current);
        }
        let leaf = self.tree.node(current).as_leaf();
        Some((leaf.key(), leaf.value()))
    }
}

impl<K, V, M: Copy> DoubleEndedIterator for Leaves<'_, K, V, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let current = self.back?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.back = self.tree.prev_leaf(current);
        }
        let leaf = self.tree.node(current).as_leaf();
        Some((leaf.key(), leaf.value()))
    }
}

impl<K, V, M: Copy> core::iter::FusedIterator for Leaves<'_, K, V, M> {}
