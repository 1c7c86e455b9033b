//! Weight-balanced binary search trees.
//!
//! A [`BbTree`] keeps the [`Weight`] (leaf count) of every subtree and requires each
//! child to hold at least a fraction `alpha` of its parent's weight.

use core::f64::consts::FRAC_1_SQRT_2;
use core::fmt;

use log::trace;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::TreeError;
use crate::iter::{Iter, Keys, Range, Values};
use crate::node_ref::NodeRef;
use crate::raw::{Handle, Inserted, Metadata, RawTree};
use crate::search_tree::SearchTree;

/// Number of leaves in a subtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weight(u32);

impl Weight {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Metadata for Weight {
    fn leaf() -> Self {
        Weight(1)
    }

    fn internal(left: Self, right: Self) -> Self {
        Weight(left.0 + right.0)
    }
}

/// Balance parameters of a [`BbTree`].
///
/// `alpha` is the smallest share of a node's weight either child may hold. When a
/// child falls below it, `alpha + epsilon` decides between a single and a double rotation.
/// Rebalancing is guaranteed to restore the balance for `2/7 < alpha <= 1 - 1/sqrt(2)`
/// and `0 <= epsilon <= alpha^2 - 2 alpha + 1/2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightBalance {
    alpha: f64,
    epsilon: f64,
}

impl WeightBalance {
    /// Validates and creates balance parameters.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidBalance`] if either parameter is outside its range.
    ///
    /// # Examples
    ///
    /// ```
    /// use leaf_tree::WeightBalance;
    ///
    /// assert!(WeightBalance::new(0.29, 0.0).is_ok());
    /// assert!(WeightBalance::new(0.25, 0.0).is_err());
    /// assert!(WeightBalance::new(0.29, 0.01).is_err());
    /// ```
    pub fn new(alpha: f64, epsilon: f64) -> Result<Self, TreeError> {
        let alpha_ok = alpha > 2.0 / 7.0 && alpha <= 1.0 - FRAC_1_SQRT_2;
        let epsilon_ok = epsilon >= 0.0 && epsilon <= alpha * alpha - 2.0 * alpha + 0.5;
        if alpha_ok && epsilon_ok {
            Ok(WeightBalance { alpha, epsilon })
        } else {
            Err(TreeError::InvalidBalance { alpha, epsilon })
        }
    }

    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    #[must_use]
    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for WeightBalance {
    /// `alpha = 0.288`, `epsilon = 0.005`.
    fn default() -> Self {
        WeightBalance {
            alpha: 0.288,
            epsilon: 0.005,
        }
    }
}

/// An ordered map based on a BB[α] tree with all entries stored in the leaves.
///
/// # Examples
///
/// ```
/// use leaf_tree::{BbTree, WeightBalance};
///
/// let mut tree = BbTree::with_balance(WeightBalance::new(0.29, 0.004).unwrap());
/// for key in (0..100).rev() {
///     tree.insert(key, key.to_string());
/// }
/// assert_eq!(tree.find(&42).map(String::as_str), Some("42"));
/// assert_eq!(tree.root().unwrap().meta().get(), 100);
/// ```
pub struct BbTree<K, V, C = NaturalOrder> {
    raw: RawTree<K, V, Weight>,
    cmp: C,
    balance: WeightBalance,
}

impl<K, V> BbTree<K, V> {
    /// Makes a new, empty `BbTree` ordered by `K`'s [`Ord`] implementation.
    #[must_use]
    pub fn new() -> Self {
        BbTree::with_comparator(NaturalOrder)
    }

    #[must_use]
    pub fn with_balance(balance: WeightBalance) -> Self {
        BbTree::with_comparator_and_balance(NaturalOrder, balance)
    }
}

impl<K, V, C> BbTree<K, V, C> {
    /// Makes a new, empty `BbTree` ordered by `cmp`, with the default balance parameters.
    #[must_use]
    pub fn with_comparator(cmp: C) -> Self {
        BbTree::with_comparator_and_balance(cmp, WeightBalance::default())
    }

    #[must_use]
    pub const fn with_comparator_and_balance(cmp: C, balance: WeightBalance) -> Self {
        BbTree {
            raw: RawTree::new(),
            cmp,
            balance,
        }
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    pub fn balance(&self) -> WeightBalance {
        self.balance
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

    pub fn root(&self) -> Option<NodeRef<'_, K, V, Weight>> {
        NodeRef::root(&self.raw)
    }

    pub fn iter(&self) -> Iter<'_, K, V, Weight> {
        self.raw.iter()
    }

    pub fn keys(&self) -> Keys<'_, K, V, Weight> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V, Weight> {
        Values { inner: self.iter() }
    }
}

impl<K: Clone, V, C: Comparator<K>> BbTree<K, V, C> {
    /// Inserts a key-value pair, returning the previous value if the key was present.
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
                rebalance(&mut self.raw, parent, self.balance);
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
        rebalance(&mut self.raw, removed.resume, self.balance);
        Some(removed.value)
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
    pub fn find_range(&self, min: &K, max: &K) -> Range<'_, K, V, Weight> {
        self.raw.range(min, max, &self.cmp)
    }
}

#[inline]
fn weight<K, V>(raw: &RawTree<K, V, Weight>, node: Handle) -> f64 {
    f64::from(raw.meta(node).get())
}

/// Walks from `from` to the root, restoring weights and rotating every node whose
/// lighter child dropped below `alpha` of its weight.
fn rebalance<K, V>(raw: &mut RawTree<K, V, Weight>, from: Option<Handle>, balance: WeightBalance) {
    let WeightBalance { alpha, epsilon } = balance;

    let mut current = from;
    while let Some(node) = current {
        raw.recompute_meta(node);
        let total = weight(raw, node);
        let (left, right) = raw.children(node).expect("rebalancing starts at an internal node");

        if weight(raw, right) < alpha * total {
            let (outer, _) = raw.children(left).expect("the heavy child is internal");
            if weight(raw, outer) > (alpha + epsilon) * total {
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
        } else if weight(raw, left) < alpha * total {
            let (_, outer) = raw.children(right).expect("the heavy child is internal");
            if weight(raw, outer) > (alpha + epsilon) * total {
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
        }

        current = raw.parent(node);
    }
}

impl<K: Clone, V, C: Comparator<K>> SearchTree<K, V> for BbTree<K, V, C> {
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        BbTree::insert(self, key, value)
    }

    fn delete(&mut self, key: &K) -> Result<Option<V>, TreeError> {
        Ok(BbTree::delete(self, key))
    }

    fn find(&self, key: &K) -> Option<&V> {
        BbTree::find(self, key)
    }

    fn len(&self) -> usize {
        BbTree::len(self)
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for BbTree<K, V, C> {
    fn clone(&self) -> Self {
        BbTree {
            raw: self.raw.clone(),
            cmp: self.cmp.clone(),
            balance: self.balance,
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for BbTree<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for BbTree<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for BbTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default> Default for BbTree<K, V, C> {
    fn default() -> Self {
        BbTree::with_comparator(C::default())
    }
}

impl<K: Clone, V, C: Comparator<K> + Default> FromIterator<(K, V)> for BbTree<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = BbTree::default();
        tree.extend(iter);
        tree
    }
}

impl<K: Clone, V, C: Comparator<K>> Extend<(K, V)> for BbTree<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord + Clone, V, const N: usize> From<[(K, V); N]> for BbTree<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V, C> IntoIterator for &'a BbTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, Weight>;

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

    fn validate_invariants<K: Ord + Clone + fmt::Debug, V, C>(tree: &BbTree<K, V, C>) {
        tree.raw.validate_structure();
        let Some(root) = tree.raw.root() else {
            return;
        };

        let alpha = tree.balance.alpha();
        let mut errors: Vec<String> = Vec::new();
        let mut stack = alloc::vec![root];
        while let Some(node) = stack.pop() {
            let Some((left, right)) = tree.raw.children(node) else {
                if tree.raw.meta(node) != Weight(1) {
                    errors.push(format!("leaf {node:?} has weight {:?}", tree.raw.meta(node)));
                }
                continue;
            };
            let (wl, wr, w) = (weight(&tree.raw, left), weight(&tree.raw, right), weight(&tree.raw, node));
            if wl + wr != w {
                errors.push(format!("stale weight at {node:?}: {w} over ({wl}, {wr})"));
            }
            if wl < alpha * w || wr < alpha * w {
                errors.push(format!("unbalanced {node:?}: ({wl}, {wr})"));
            }
            stack.extend([left, right]);
        }

        assert!(errors.is_empty(), "BB[α] invariant violations:\n{}", errors.join("\n"));
    }

    #[test]
    fn balance_parameter_bounds() {
        assert_eq!(WeightBalance::default(), WeightBalance::new(0.288, 0.005).unwrap());
        assert!(WeightBalance::new(1.0 - FRAC_1_SQRT_2, 0.0).is_ok());
        assert!(WeightBalance::new(2.0 / 7.0, 0.0).is_err());
        assert!(WeightBalance::new(0.3, 0.0).is_err());
        assert!(WeightBalance::new(0.288, -0.001).is_err());
        assert!(WeightBalance::new(f64::NAN, 0.0).is_err());
        assert_eq!(
            WeightBalance::new(0.5, 0.1),
            Err(TreeError::InvalidBalance { alpha: 0.5, epsilon: 0.1 })
        );
    }

    #[test]
    fn sequential_inserts_and_deletes() {
        let mut tree = BbTree::new();
        for key in 0..500 {
            tree.insert(key, ());
            validate_invariants(&tree);
        }
        assert_eq!(tree.raw.meta(tree.raw.root().unwrap()), Weight(500));
        for key in (0..500).step_by(2) {
            assert_eq!(tree.delete(&key), Some(()));
            validate_invariants(&tree);
        }
        assert!(tree.keys().copied().eq((1..500).step_by(2)));
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(u16),
        Delete(u16),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0u16..300).prop_map(Op::Insert),
            2 => (0u16..300).prop_map(Op::Delete),
        ]
    }

    fn balance_strategy() -> impl Strategy<Value = WeightBalance> {
        (0.2858f64..0.2928, 0.0f64..1.0).prop_filter_map("parameters out of range", |(alpha, share)| {
            let epsilon = share * (alpha * alpha - 2.0 * alpha + 0.5);
            WeightBalance::new(alpha, epsilon).ok()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn matches_btreemap(balance in balance_strategy(), ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree = BbTree::with_balance(balance);
            let mut model = BTreeMap::new();

            for (step, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Insert(k) => prop_assert_eq!(tree.insert(k, step), model.insert(k, step)),
                    Op::Delete(k) => prop_assert_eq!(tree.delete(&k), model.remove(&k)),
                }
                validate_invariants(&tree);
            }

            prop_assert!(tree.iter().eq(model.iter()));
        }
    }
}
