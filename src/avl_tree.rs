//! Height-balanced binary search trees.
//!
//! Every internal node of an [`AvlTree`] records the [`Height`] of its subtree, and the
//! heights of its two children differ by at most one. This keeps the depth of a tree with
//! `n` keys below `1.44 log2(n + 2)`, and it makes [`join`](AvlTree::join) and
//! [`split`](AvlTree::split) possible in logarithmic time.

use core::fmt;

use log::{debug, trace};
use smallvec::SmallVec;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::TreeError;
use crate::iter::{Iter, Keys, Range, Values};
use crate::node_ref::NodeRef;
use crate::raw::{Handle, Inserted, Metadata, Node, RawTree};
use crate::search_tree::SearchTree;

/// Number of edges on the longest path from a node down to a leaf.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Height(u32);

impl Height {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Metadata for Height {
    fn leaf() -> Self {
        Height(0)
    }

    fn internal(left: Self, right: Self) -> Self {
        Height(1 + left.0.max(right.0))
    }
}

// Subtrees hanging off a split path. Deep enough for any tree that fits in memory.
type Fringe<K> = SmallVec<[(K, Handle); 64]>;

/// An ordered map based on an AVL tree with all entries stored in the leaves.
///
/// # Examples
///
/// ```
/// use leaf_tree::AvlTree;
///
/// let mut tree = AvlTree::new();
/// for key in 0..20 {
///     tree.insert(key, key * key);
/// }
/// assert_eq!(tree.delete(&3), Some(9));
/// assert_eq!(tree.delete(&7), Some(49));
/// assert_eq!(tree.delete(&7), None);
///
/// assert_eq!(tree.find(&4), Some(&16));
/// assert_eq!(tree.len(), 18);
/// assert!(tree.depth() <= 6);
/// ```
pub struct AvlTree<K, V, C = NaturalOrder> {
    raw: RawTree<K, V, Height>,
    cmp: C,
}

impl<K, V> AvlTree<K, V> {
    /// Makes a new, empty `AvlTree` ordered by `K`'s [`Ord`] implementation.
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> Self {
        AvlTree {
            raw: RawTree::new(),
            cmp: NaturalOrder,
        }
    }
}

impl<K, V, C> AvlTree<K, V, C> {
    /// Makes a new, empty `AvlTree` ordered by `cmp`.
    #[must_use]
    pub const fn with_comparator(cmp: C) -> Self {
        AvlTree {
            raw: RawTree::new(),
            cmp,
        }
    }

    /// Returns the comparator ordering this tree.
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Returns the number of entries in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the tree contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Number of edges on the longest root-to-leaf path. Zero for empty and single-entry trees.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.raw.root().map_or(0, |root| height(&self.raw, root) as usize)
    }

    /// Returns a view of the root node for structural inspection.
    pub fn root(&self) -> Option<NodeRef<'_, K, V, Height>> {
        NodeRef::root(&self.raw)
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V, Height> {
        self.raw.iter()
    }

    /// Gets an iterator over the keys of the tree, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V, Height> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the tree, in order by key.
    pub fn values(&self) -> Values<'_, K, V, Height> {
        Values { inner: self.iter() }
    }
}

impl<K: Clone, V, C: Comparator<K>> AvlTree<K, V, C> {
    /// Inserts a key-value pair, returning the previous value if the key was present.
    ///
    /// Replacing the value of an existing key does not touch the shape of the tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.raw.insert_leaf(key, value, &self.cmp) {
            Inserted::Replaced(old) => Some(old),
            Inserted::Root => None,
            Inserted::Split(internal) => {
                let parent = self.raw.parent(internal);
                rebalance(&mut self.raw, parent);
                None
            }
        }
    }

    /// Removes a key, returning its value if it was present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let removed = self.raw.remove_leaf(key, &self.cmp)?;
        rebalance(&mut self.raw, removed.resume);
        Some(removed.value)
    }

    /// Returns the value stored under `key`.
    pub fn find(&self, key: &K) -> Option<&V> {
        self.raw.get(key, &self.cmp)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.raw.get_mut(key, &self.cmp)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.search(key, &self.cmp).is_some()
    }

    /// Gets an iterator over the entries with `min <= key <= max`, in order.
    ///
    /// ```
    /// use leaf_tree::AvlTree;
    ///
    /// let tree: AvlTree<_, _> = (0..10).map(|k| (k * 10, k)).collect();
    /// let hits: Vec<_> = tree.find_range(&25, &60).map(|(k, _)| *k).collect();
    /// assert_eq!(hits, [30, 40, 50, 60]);
    /// ```
    pub fn find_range(&self, min: &K, max: &K) -> Range<'_, K, V, Height> {
        self.raw.range(min, max, &self.cmp)
    }

    /// Concatenates two trees whose key ranges are separated by `boundary`.
    ///
    /// Every key of `left` must be less than `boundary`, and `boundary` must be the
    /// smallest key of `right`. The comparator of `left` is kept.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::OverlappingRanges`] if some key of `left` is not less than
    /// `boundary`, and [`TreeError::BoundaryMismatch`] if `boundary` is not the smallest
    /// key of `right`.
    ///
    /// # Complexity
    ///
    /// O(log n) rotations, plus moving the nodes of the smaller tree into the arena of the larger.
    ///
    /// # Examples
    ///
    /// ```
    /// use leaf_tree::AvlTree;
    ///
    /// let low: AvlTree<_, _> = (0..5).map(|k| (k, ())).collect();
    /// let high: AvlTree<_, _> = (5..100).map(|k| (k, ())).collect();
    /// let all = AvlTree::join(5, low, high).unwrap();
    /// assert_eq!(all.len(), 100);
    /// assert!(all.keys().copied().eq(0..100));
    /// ```
    pub fn join(boundary: K, left: Self, right: Self) -> Result<Self, TreeError> {
        let cmp = left.cmp;
        if let Some(root) = left.raw.root() {
            let max = left.raw.key(left.raw.last_leaf(root));
            if !cmp.is_lt(max, &boundary) {
                return Err(TreeError::OverlappingRanges);
            }
        }
        if let Some(root) = right.raw.root() {
            let min = right.raw.key(right.raw.first_leaf(root));
            if !cmp.is_eq(min, &boundary) {
                return Err(TreeError::BoundaryMismatch);
            }
        }

        let len = left.raw.len() + right.raw.len();
        let (mut raw, left_root, right_root) = match (left.raw.root(), right.raw.root()) {
            (_, None) => return Ok(AvlTree { raw: left.raw, cmp }),
            (None, _) => return Ok(AvlTree { raw: right.raw, cmp }),
            (Some(left_root), Some(_)) if left.raw.len() >= right.raw.len() => {
                let mut raw = left.raw;
                let right_root = raw.absorb(right.raw);
                (raw, Some(left_root), right_root)
            }
            (Some(_), Some(right_root)) => {
                let mut raw = right.raw;
                let left_root = raw.absorb(left.raw);
                (raw, left_root, Some(right_root))
            }
        };
        let (Some(left_root), Some(right_root)) = (left_root, right_root) else {
            unreachable!("both trees are non-empty")
        };

        let root = join_nodes(&mut raw, boundary, left_root, right_root);
        raw.set_root(Some(root));
        raw.set_len(len);
        Ok(AvlTree { raw, cmp })
    }

    /// Splits the tree into the entries with keys less than `key` and the rest.
    ///
    /// # Complexity
    ///
    /// O(log n) rotations, plus moving the nodes of the shallower result out of the arena.
    ///
    /// # Examples
    ///
    /// ```
    /// use leaf_tree::AvlTree;
    ///
    /// let tree: AvlTree<_, _> = (0..50).map(|k| (k, k)).collect();
    /// let (low, high) = tree.split(&20);
    /// assert!(low.keys().copied().eq(0..20));
    /// assert!(high.keys().copied().eq(20..50));
    /// ```
    #[must_use]
    pub fn split(mut self, key: &K) -> (Self, Self)
    where
        C: Clone,
    {
        let total = self.raw.len();
        let (left, right) = split_nodes(&mut self.raw, key, &self.cmp);
        let cmp = self.cmp.clone();

        let (left, right) = match (left, right) {
            (None, right) => {
                self.raw.set_root(right);
                (AvlTree::with_comparator(cmp), self)
            }
            (left, None) => {
                self.raw.set_root(left);
                (self, AvlTree::with_comparator(cmp))
            }
            (Some(left), Some(right)) => {
                // The deeper side stays in place.
                let left_stays = height(&self.raw, left) >= height(&self.raw, right);
                let (stays, leaves) = if left_stays { (left, right) } else { (right, left) };
                let moved = AvlTree {
                    raw: self.raw.detach(leaves),
                    cmp,
                };
                self.raw.set_root(Some(stays));
                self.raw.set_len(total - moved.len());
                if left_stays { (self, moved) } else { (moved, self) }
            }
        };
        debug!("split {total} entries into {} and {}", left.len(), right.len());
        (left, right)
    }
}

#[inline]
fn height<K, V>(raw: &RawTree<K, V, Height>, node: Handle) -> u32 {
    raw.meta(node).get()
}

/// Walks from `from` to the root, restoring heights and the balance of every node on the way.
fn rebalance<K, V>(raw: &mut RawTree<K, V, Height>, from: Option<Handle>) {
    let mut current = from;
    while let Some(node) = current {
        let (left, right) = raw.children(node).expect("rebalancing starts at an internal node");
        let (left_height, right_height) = (height(raw, left), height(raw, right));

        if left_height == right_height + 2 {
            let (outer, _) = raw.children(left).expect("the taller child is internal");
            if height(raw, outer) == right_height + 1 {
                trace!("right rotation at {node:?}");
                raw.right_rotation(node);
                raw.recompute_meta(raw.right(node));
            } else {
                trace!("left-right rotation at {node:?}");
                raw.left_rotation(left);
                raw.right_rotation(node);
                raw.recompute_meta(raw.left(node));
                raw.recompute_meta(raw.right(node));
            }
            raw.recompute_meta(node);
        } else if right_height == left_height + 2 {
            let (_, outer) = raw.children(right).expect("the taller child is internal");
            if height(raw, outer) == left_height + 1 {
                trace!("left rotation at {node:?}");
                raw.left_rotation(node);
                raw.recompute_meta(raw.left(node));
            } else {
                trace!("right-left rotation at {node:?}");
                raw.right_rotation(right);
                raw.left_rotation(node);
                raw.recompute_meta(raw.left(node));
                raw.recompute_meta(raw.right(node));
            }
            raw.recompute_meta(node);
        } else {
            let updated = Height::internal(Height(left_height), Height(right_height));
            if raw.meta(node) == updated {
                // Nothing above can change.
                return;
            }
            raw.set_meta(node, updated);
        }

        current = raw.parent(node);
    }
}

/// Joins two balanced subtrees of the same arena under `key`, the smallest key of `right`.
///
/// Returns the root of the joined tree, which is the root of the taller input when the
/// heights differ by more than one.
fn join_nodes<K, V>(raw: &mut RawTree<K, V, Height>, key: K, left: Handle, right: Handle) -> Handle {
    let (left_height, right_height) = (height(raw, left), height(raw, right));
    if left_height.abs_diff(right_height) <= 1 {
        return raw.create_internal(key, left, right);
    }

    let (root, node) = if left_height < right_height {
        let mut node = right;
        while height(raw, node) > left_height {
            node = raw.left(node);
        }
        (right, node)
    } else {
        let mut node = left;
        while height(raw, node) > right_height {
            node = raw.right(node);
        }
        (left, node)
    };

    let splice_at = raw.parent(node).expect("the spine node sits below the root");
    let joined = if root == right {
        raw.create_internal(key, left, node)
    } else {
        raw.create_internal(key, node, right)
    };
    raw.replace_child(Some(splice_at), node, joined);
    trace!("join spliced {joined:?} under {splice_at:?}");

    rebalance(raw, Some(splice_at));
    root
}

/// Cuts the tree along the search path of `key` and reassembles both sides.
///
/// Returns the roots of the trees holding the keys less than `key` and the rest.
/// Both stay in the arena of `raw`; its root and length are left for the caller to fix.
fn split_nodes<K, V, C: Comparator<K>>(
    raw: &mut RawTree<K, V, Height>,
    key: &K,
    cmp: &C,
) -> (Option<Handle>, Option<Handle>) {
    let Some(root) = raw.root() else {
        return (None, None);
    };

    let mut lesser: Fringe<K> = SmallVec::new();
    let mut greater: Fringe<K> = SmallVec::new();
    let mut current = root;
    while let Node::Internal(_) = raw.node(current) {
        let (separator, left, right) = raw.take_internal(current);
        if cmp.is_lt(key, &separator) {
            greater.push((separator, right));
            current = left;
        } else {
            lesser.push((separator, left));
            current = right;
        }
    }
    debug!("split path of {} nodes", lesser.len() + greater.len());

    let (mut left, mut right) = if cmp.is_le(key, raw.key(current)) {
        (None, Some(current))
    } else {
        (Some(current), None)
    };

    while let Some((separator, subtree)) = lesser.pop() {
        left = Some(match left {
            Some(acc) => join_nodes(raw, separator, subtree, acc),
            None => subtree,
        });
    }
    while let Some((separator, subtree)) = greater.pop() {
        right = Some(match right {
            Some(acc) => join_nodes(raw, separator, acc, subtree),
            None => subtree,
        });
    }

    (left, right)
}

impl<K: Clone, V, C: Comparator<K>> SearchTree<K, V> for AvlTree<K, V, C> {
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        AvlTree::insert(self, key, value)
    }

    fn delete(&mut self, key: &K) -> Result<Option<V>, TreeError> {
        Ok(AvlTree::delete(self, key))
    }

    fn find(&self, key: &K) -> Option<&V> {
        AvlTree::find(self, key)
    }

    fn len(&self) -> usize {
        AvlTree::len(self)
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for AvlTree<K, V, C> {
    fn clone(&self) -> Self {
        AvlTree {
            raw: self.raw.clone(),
            cmp: self.cmp.clone(),
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for AvlTree<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for AvlTree<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for AvlTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default> Default for AvlTree<K, V, C> {
    fn default() -> Self {
        AvlTree::with_comparator(C::default())
    }
}

impl<K: Clone, V, C: Comparator<K> + Default> FromIterator<(K, V)> for AvlTree<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = AvlTree::default();
        tree.extend(iter);
        tree
    }
}

impl<K: Clone, V, C: Comparator<K>> Extend<(K, V)> for AvlTree<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord + Clone, V, const N: usize> From<[(K, V); N]> for AvlTree<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V, C> IntoIterator for &'a AvlTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, Height>;

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

    fn validate_invariants<K: Ord + Clone + fmt::Debug, V, C>(tree: &AvlTree<K, V, C>) {
        tree.raw.validate_structure();
        let Some(root) = tree.raw.root() else {
            return;
        };

        let mut errors: Vec<String> = Vec::new();
        let mut stack = alloc::vec![root];
        while let Some(node) = stack.pop() {
            let Some((left, right)) = tree.raw.children(node) else {
                if height(&tree.raw, node) != 0 {
                    errors.push(format!("leaf {node:?} has non-zero height"));
                }
                continue;
            };
            let (hl, hr) = (height(&tree.raw, left), height(&tree.raw, right));
            if height(&tree.raw, node) != 1 + hl.max(hr) {
                errors.push(format!("stale height at {node:?}: {} over ({hl}, {hr})", height(&tree.raw, node)));
            }
            if hl.abs_diff(hr) > 1 {
                errors.push(format!("unbalanced {node:?}: ({hl}, {hr})"));
            }
            stack.extend([left, right]);
        }

        assert!(errors.is_empty(), "AVL invariant violations:\n{}", errors.join("\n"));
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut tree = AvlTree::new();
        for key in 0..1000 {
            tree.insert(key, ());
        }
        validate_invariants(&tree);
        assert!(tree.depth() <= 14);
        let root = tree.raw.root();

        // Rotations keep the identity of the root.
        tree.insert(1000, ());
        assert_eq!(tree.raw.root(), root);
    }

    #[test]
    fn overwrite_keeps_shape() {
        let mut tree: AvlTree<_, _> = (0..10).map(|k| (k, k)).collect();
        let before: Vec<_> = tree.raw.leaves().map(|(k, _)| *k).collect();
        let root = tree.raw.root();
        assert_eq!(tree.insert(4, 40), Some(4));
        assert_eq!(tree.raw.root(), root);
        assert_eq!(tree.find(&4), Some(&40));
        assert_eq!(tree.raw.leaves().map(|(k, _)| *k).collect::<Vec<_>>(), before);
    }

    #[test]
    fn join_rejects_bad_boundaries() {
        let low: AvlTree<_, _> = (0..5).map(|k| (k, ())).collect();
        let high: AvlTree<_, _> = (5..9).map(|k| (k, ())).collect();
        assert_eq!(
            AvlTree::join(4, low.clone(), high.clone()).unwrap_err(),
            TreeError::OverlappingRanges
        );
        assert_eq!(AvlTree::join(6, low.clone(), high.clone()).unwrap_err(), TreeError::BoundaryMismatch);
        assert_eq!(AvlTree::join(5, high, low).unwrap_err(), TreeError::OverlappingRanges);
    }

    #[test]
    fn join_with_empty_sides() {
        let empty: AvlTree<i32, ()> = AvlTree::new();
        let some: AvlTree<_, _> = (3..7).map(|k| (k, ())).collect();

        let joined = AvlTree::join(3, empty.clone(), some.clone()).unwrap();
        assert_eq!(joined, some);
        let joined = AvlTree::join(10, some.clone(), empty.clone()).unwrap();
        assert_eq!(joined, some);
        let joined = AvlTree::join(0, empty.clone(), empty).unwrap();
        assert!(joined.is_empty());
    }

    #[test]
    fn split_at_extremes() {
        let tree: AvlTree<_, _> = (10..20).map(|k| (k, ())).collect();

        let (low, high) = tree.clone().split(&0);
        assert!(low.is_empty());
        assert_eq!(high, tree);

        let (low, high) = tree.clone().split(&100);
        assert_eq!(low, tree);
        assert!(high.is_empty());

        let (low, high) = tree.clone().split(&10);
        assert!(low.is_empty());
        assert_eq!(high.len(), 10);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(u16, u16),
        Delete(u16),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0u16..256, any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
            2 => (0u16..256).prop_map(Op::Delete),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn matches_btreemap(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree = AvlTree::new();
            let mut model = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(k, v) => prop_assert_eq!(tree.insert(k, v), model.insert(k, v)),
                    Op::Delete(k) => prop_assert_eq!(tree.delete(&k), model.remove(&k)),
                }
                validate_invariants(&tree);
            }

            prop_assert_eq!(tree.len(), model.len());
            prop_assert!(tree.iter().eq(model.iter()));
        }

        #[test]
        fn split_then_join_restores(keys in prop::collection::btree_set(0i32..2000, 0..300), at in 0i32..2000) {
            let tree: AvlTree<_, _> = keys.iter().map(|&k| (k, k * 2)).collect();
            let (low, high) = tree.clone().split(&at);
            validate_invariants(&low);
            validate_invariants(&high);
            prop_assert!(low.keys().all(|&k| k < at));
            prop_assert!(high.keys().all(|&k| k >= at));
            prop_assert_eq!(low.len() + high.len(), keys.len());

            let boundary = high.keys().next().copied().unwrap_or(at);
            let joined = AvlTree::join(boundary, low, high).unwrap();
            validate_invariants(&joined);
            prop_assert_eq!(joined, tree);
        }

        #[test]
        fn join_uneven_heights(small in 0usize..20, large in 0usize..600) {
            let low: AvlTree<_, _> = (0..small).map(|k| (k, ())).collect();
            let high: AvlTree<_, _> = (small..small + large).map(|k| (k, ())).collect();
            let joined = AvlTree::join(small, low, high).unwrap();
            validate_invariants(&joined);
            prop_assert!(joined.keys().copied().eq(0..small + large));

            let low: AvlTree<_, _> = (0..large).map(|k| (k, ())).collect();
            let high: AvlTree<_, _> = (large..large + small).map(|k| (k, ())).collect();
            let joined = AvlTree::join(large, low, high).unwrap();
            validate_invariants(&joined);
            prop_assert!(joined.keys().copied().eq(0..small + large));
        }
    }
}
