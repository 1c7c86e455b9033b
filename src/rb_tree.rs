//! Red-black trees with top-down insertion.
//!
//! Insertion splits every black node with two red children on the way down, so the
//! leaf reached at the bottom can be split without any fix-up pass towards the root.
//! Removal is not supported.

use core::fmt;

use log::trace;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::TreeError;
use crate::iter::{Iter, Keys, Range, Values};
use crate::node_ref::NodeRef;
use crate::raw::{Handle, Metadata, RawTree};
use crate::search_tree::SearchTree;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Metadata for Color {
    fn leaf() -> Self {
        Color::Red
    }

    fn internal(_: Self, _: Self) -> Self {
        Color::Black
    }
}

/// An ordered map based on a red-black tree with all entries stored in the leaves.
///
/// The root is black, a red node never has a red child, and every root-to-leaf path
/// crosses the same number of black nodes.
///
/// # Examples
///
/// ```
/// use leaf_tree::{Color, RbTree, TreeError};
///
/// let mut tree: RbTree<_, _> = (0..64).map(|k| (k, ())).collect();
/// assert_eq!(tree.root().unwrap().meta(), Color::Black);
/// assert!(tree.depth() <= 13);
/// assert!(matches!(tree.delete(&3), Err(TreeError::Unsupported { .. })));
/// assert!(tree.contains_key(&3));
/// ```
pub struct RbTree<K, V, C = NaturalOrder> {
    raw: RawTree<K, V, Color>,
    cmp: C,
}

impl<K, V> RbTree<K, V> {
    /// Makes a new, empty `RbTree` ordered by `K`'s [`Ord`] implementation.
    #[must_use]
    pub const fn new() -> Self {
        RbTree {
            raw: RawTree::new(),
            cmp: NaturalOrder,
        }
    }
}

impl<K, V, C> RbTree<K, V, C> {
    #[must_use]
    pub const fn with_comparator(cmp: C) -> Self {
        RbTree {
            raw: RawTree::new(),
            cmp,
        }
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Number of edges on the longest root-to-leaf path.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.raw.root().map_or(0, |root| self.raw.depth(root))
    }

    pub fn root(&self) -> Option<NodeRef<'_, K, V, Color>> {
        NodeRef::root(&self.raw)
    }

    pub fn iter(&self) -> Iter<'_, K, V, Color> {
        self.raw.iter()
    }

    pub fn keys(&self) -> Keys<'_, K, V, Color> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V, Color> {
        Values { inner: self.iter() }
    }

    fn color(&self, node: Handle) -> Color {
        self.raw.meta(node)
    }

    /// Splits the black node `current`, whose children are both red.
    ///
    /// `upper` is the nearest black proper ancestor of `current`.
    fn split_four_node(&mut self, upper: Option<Handle>, current: Handle) {
        let raw = &mut self.raw;
        let (left, right) = raw.children(current).expect("a 4-node is internal");

        let Some(upper) = upper else {
            trace!("splitting the root 4-node");
            raw.set_meta(left, Color::Black);
            raw.set_meta(right, Color::Black);
            return;
        };

        let parent = raw.parent(current).expect("`current` sits below `upper`");
        if parent == upper {
            trace!("color flip at {current:?}");
            raw.set_meta(left, Color::Black);
            raw.set_meta(right, Color::Black);
            raw.set_meta(current, Color::Red);
            return;
        }

        // `parent` is red and hangs directly off `upper`.
        debug_assert_eq!(raw.meta(parent), Color::Red);
        debug_assert_eq!(raw.parent(parent), Some(upper));
        if raw.is_left_child(upper, parent) {
            if raw.is_left_child(parent, current) {
                trace!("right rotation at {upper:?}");
            } else {
                trace!("left-right rotation at {upper:?}");
                raw.left_rotation(parent);
            }
            raw.right_rotation(upper);
        } else {
            if raw.is_left_child(parent, current) {
                trace!("right-left rotation at {upper:?}");
                raw.right_rotation(parent);
            } else {
                trace!("left rotation at {upper:?}");
            }
            raw.left_rotation(upper);
        }

        // `upper` stays black over two red children with black children of their own.
        let (left, right) = raw.children(upper).expect("`upper` is internal");
        for child in [left, right] {
            raw.set_meta(child, Color::Red);
            let (outer, inner) = raw.children(child).expect("rotated nodes are internal");
            raw.set_meta(outer, Color::Black);
            raw.set_meta(inner, Color::Black);
        }
    }
}

impl<K: Clone, V, C: Comparator<K>> RbTree<K, V, C> {
    /// Inserts a key-value pair, returning the previous value if the key was present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let Some(root) = self.raw.root() else {
            let leaf = self.raw.create_leaf(key, value);
            self.raw.set_meta(leaf, Color::Black);
            self.raw.set_root(Some(leaf));
            self.raw.set_len(1);
            return None;
        };

        let mut upper = None;
        let mut current = root;
        while let Some((left, right)) = self.raw.children(current) {
            let next = if self.cmp.is_lt(&key, self.raw.key(current)) { left } else { right };
            let four_node = self.color(current) == Color::Black
                && self.color(left) == Color::Red
                && self.color(right) == Color::Red;
            if four_node {
                self.split_four_node(upper, current);
            }
            if self.color(current) == Color::Black {
                upper = Some(current);
            }
            current = next;
        }

        if self.cmp.is_eq(self.raw.key(current), &key) {
            let slot = self.raw.node_mut(current).as_leaf_mut().value_mut();
            return Some(core::mem::replace(slot, value));
        }

        debug_assert_eq!(self.color(current), Color::Black, "the target leaf is black");
        let leaf = self.raw.create_leaf(key, value);
        let internal = self.raw.split_leaf(current, leaf, &self.cmp);
        self.raw.set_meta(internal, Color::Black);
        self.raw.set_meta(current, Color::Red);
        self.raw.set_len(self.raw.len() + 1);
        None
    }

    /// Always fails: red-black trees here do not support removal.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Unsupported`] for every key, present or not. The tree is left untouched.
    pub fn delete(&mut self, _key: &K) -> Result<Option<V>, TreeError> {
        Err(TreeError::Unsupported {
            operation: "delete",
            structure: "red-black tree",
        })
    }

    pub fn find(&self, key: &K) -> Option<&V> {
        self.raw.get(key, &self.cmp)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.raw.get_mut(key, &self.cmp)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.search(key, &self.cmp).is_some()
    }

    /// Gets an iterator over the entries with `min <= key <= max`, in order.
    pub fn find_range(&self, min: &K, max: &K) -> Range<'_, K, V, Color> {
        self.raw.range(min, max, &self.cmp)
    }
}

impl<K: Clone, V, C: Comparator<K>> SearchTree<K, V> for RbTree<K, V, C> {
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        RbTree::insert(self, key, value)
    }

    fn delete(&mut self, key: &K) -> Result<Option<V>, TreeError> {
        RbTree::delete(self, key)
    }

    fn find(&self, key: &K) -> Option<&V> {
        RbTree::find(self, key)
    }

    fn len(&self) -> usize {
        RbTree::len(self)
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for RbTree<K, V, C> {
    fn clone(&self) -> Self {
        RbTree {
            raw: self.raw.clone(),
            cmp: self.cmp.clone(),
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for RbTree<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for RbTree<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RbTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default> Default for RbTree<K, V, C> {
    fn default() -> Self {
        RbTree::with_comparator(C::default())
    }
}

impl<K: Clone, V, C: Comparator<K> + Default> FromIterator<(K, V)> for RbTree<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = RbTree::default();
        tree.extend(iter);
        tree
    }
}

impl<K: Clone, V, C: Comparator<K>> Extend<(K, V)> for RbTree<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord + Clone, V, const N: usize> From<[(K, V); N]> for RbTree<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V, C> IntoIterator for &'a RbTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn validate_invariants<K: Ord + Clone + fmt::Debug, V, C>(tree: &RbTree<K, V, C>) {
        tree.raw.validate_structure();
        let Some(root) = tree.raw.root() else {
            return;
        };

        let mut errors: Vec<String> = Vec::new();
        if tree.color(root) != Color::Black {
            errors.push("root is red".into());
        }
        let mut black_heights = Vec::new();
        let mut stack = alloc::vec![(root, 0usize)];
        while let Some((node, blacks)) = stack.pop() {
            let blacks = blacks + usize::from(tree.color(node) == Color::Black);
            match tree.raw.children(node) {
                Some((left, right)) => {
                    for child in [left, right] {
                        if tree.color(node) == Color::Red && tree.color(child) == Color::Red {
                            errors.push(format!("red {node:?} has red child {child:?}"));
                        }
                        stack.push((child, blacks));
                    }
                }
                None => black_heights.push(blacks),
            }
        }
        if black_heights.windows(2).any(|pair| pair[0] != pair[1]) {
            errors.push(format!("uneven black heights: {black_heights:?}"));
        }

        assert!(errors.is_empty(), "red-black invariant violations:\n{}", errors.join("\n"));
    }

    #[test]
    fn first_leaf_is_black() {
        let mut tree = RbTree::new();
        tree.insert(1, 'a');
        assert_eq!(tree.color(tree.raw.root().unwrap()), Color::Black);
        validate_invariants(&tree);

        tree.insert(2, 'b');
        let root = tree.raw.root().unwrap();
        let (left, right) = tree.raw.children(root).unwrap();
        assert_eq!(
            (tree.color(root), tree.color(left), tree.color(right)),
            (Color::Black, Color::Red, Color::Red)
        );
    }

    #[test]
    fn delete_is_unsupported_and_harmless() {
        let mut tree: RbTree<_, _> = (0..10).map(|k| (k, k)).collect();
        let before = tree.clone();
        assert_eq!(
            tree.delete(&4),
            Err(TreeError::Unsupported {
                operation: "delete",
                structure: "red-black tree"
            })
        );
        assert!(tree.delete(&40).is_err());
        assert_eq!(tree, before);
        validate_invariants(&tree);
    }

    #[test]
    fn ascending_and_descending_runs() {
        let mut tree = RbTree::new();
        for key in 0..512 {
            tree.insert(key, ());
        }
        for key in (1000..1512).rev() {
            tree.insert(key, ());
        }
        validate_invariants(&tree);
        // At most 2 log2(n) + 1 edges deep.
        assert!(tree.depth() <= 21);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn matches_btreemap(entries in prop::collection::vec((0u16..500, any::<u8>()), 0..400)) {
            let mut tree = RbTree::new();
            let mut model = BTreeMap::new();

            for (k, v) in entries {
                prop_assert_eq!(tree.insert(k, v), model.insert(k, v));
                validate_invariants(&tree);
            }

            prop_assert_eq!(tree.len(), model.len());
            prop_assert!(tree.iter().eq(model.iter()));
            for k in 0u16..500 {
                prop_assert_eq!(tree.find(&k), model.get(&k));
            }
        }
    }
}
