//! Static interval trees answering stabbing queries over closed intervals.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use log::debug;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::TreeError;
use crate::interval::Interval;
use crate::node_ref::NodeRef;
use crate::raw::{Handle, RawTree};

/// Intervals attached to one node, as indices into `IntervalTree::intervals`.
#[derive(Clone, Debug, Default)]
struct Attached {
    /// Sorted by `min`, ascending.
    by_min: Vec<usize>,
    /// Sorted by `max`, descending.
    by_max: Vec<usize>,
}

/// A set of closed intervals `[min, max]`, built once and queried by point.
///
/// The skeleton is a tree over the distinct interval endpoints. Each interval hangs
/// off the highest node whose key it contains, which puts every interval seen on a
/// query path either entirely to one side of the point or across it.
///
/// # Examples
///
/// ```
/// use leaf_tree::{Interval, IntervalTree};
///
/// let tree = IntervalTree::new((0..10).map(|j| Interval::new(j, j + 5))).unwrap();
/// let mut hits: Vec<_> = tree.find_intervals(&7).into_iter().map(|i| i.min).collect();
/// hits.sort();
/// assert_eq!(hits, [2, 3, 4, 5, 6, 7]);
/// ```
pub struct IntervalTree<K, C = NaturalOrder> {
    raw: RawTree<K, (), ()>,
    attached: Vec<Attached>,
    intervals: Vec<Interval<K>>,
    cmp: C,
}

impl<K: Ord + Clone> IntervalTree<K> {
    /// Builds a tree over `intervals`, ordered by `K`'s [`Ord`] implementation.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvertedInterval`] if some interval has `min > max`.
    pub fn new<I>(intervals: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = Interval<K>>,
    {
        IntervalTree::with_comparator(intervals, NaturalOrder)
    }
}

impl<K: Clone, C: Comparator<K>> IntervalTree<K, C> {
    /// Builds a tree over `intervals`, ordered by `cmp`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvertedInterval`] if some interval has `min > max`.
    ///
    /// # Complexity
    ///
    /// O(n log n)
    pub fn with_comparator<I>(intervals: I, cmp: C) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = Interval<K>>,
    {
        let intervals: Vec<Interval<K>> = intervals.into_iter().collect();
        for interval in &intervals {
            interval.check(&cmp)?;
        }

        let mut endpoints: Vec<K> = intervals
            .iter()
            .flat_map(|interval| [interval.min.clone(), interval.max.clone()])
            .collect();
        endpoints.sort_by(|a, b| cmp.compare(a, b));
        endpoints.dedup_by(|a, b| cmp.is_eq(a, b));
        let raw = RawTree::make_tree(endpoints.into_iter().map(|key| (key, ())));

        let mut attached = vec![Attached::default(); raw.node_count()];
        if let Some(root) = raw.root() {
            for (index, interval) in intervals.iter().enumerate() {
                let node = &mut attached[owner(&raw, root, interval, &cmp).to_index()];
                node.by_min.push(index);
                node.by_max.push(index);
            }
        }
        for node in &mut attached {
            node.by_min.sort_by(|&a, &b| cmp.compare(&intervals[a].min, &intervals[b].min));
            node.by_max.sort_by(|&a, &b| cmp.compare(&intervals[b].max, &intervals[a].max));
        }

        debug!("built interval tree over {} intervals, {} endpoints", intervals.len(), raw.len());
        Ok(IntervalTree {
            raw,
            attached,
            intervals,
            cmp,
        })
    }

    /// Returns every interval containing `point`, in no particular order.
    ///
    /// # Complexity
    ///
    /// O(log n + k) for k reported intervals.
    pub fn find_intervals(&self, point: &K) -> Vec<&Interval<K>> {
        let mut found = Vec::new();
        let mut current = self.raw.root();
        while let Some(node) = current {
            let attached = &self.attached[node.to_index()];
            let children = self.raw.children(node);
            if self.cmp.is_lt(point, self.raw.key(node)) {
                found.extend(
                    attached
                        .by_min
                        .iter()
                        .map(|&index| &self.intervals[index])
                        .take_while(|interval| self.cmp.is_le(&interval.min, point)),
                );
                current = children.map(|(left, _)| left);
            } else {
                found.extend(
                    attached
                        .by_max
                        .iter()
                        .map(|&index| &self.intervals[index])
                        .take_while(|interval| self.cmp.is_le(point, &interval.max)),
                );
                current = children.map(|(_, right)| right);
            }
        }
        found
    }
}

impl<K, C> IntervalTree<K, C> {
    /// Number of stored intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// The stored intervals, in construction order.
    pub fn intervals(&self) -> &[Interval<K>] {
        &self.intervals
    }

    /// Number of edges on the longest root-to-leaf path of the endpoint skeleton.
    pub fn depth(&self) -> usize {
        self.raw.root().map_or(0, |root| self.raw.depth(root))
    }

    /// Returns a view of the root of the endpoint skeleton.
    pub fn root(&self) -> Option<NodeRef<'_, K, (), ()>> {
        NodeRef::root(&self.raw)
    }
}

/// Finds the highest node whose key lies within `interval`.
fn owner<K, C: Comparator<K>>(raw: &RawTree<K, (), ()>, root: Handle, interval: &Interval<K>, cmp: &C) -> Handle {
    let mut node = root;
    loop {
        let key = raw.key(node);
        if interval.contains_closed(key, cmp) {
            return node;
        }
        let (left, right) = raw.children(node).expect("the endpoints of `interval` are leaves");
        node = if cmp.is_lt(&interval.max, key) { left } else { right };
    }
}

impl<K: Clone, C: Clone> Clone for IntervalTree<K, C> {
    fn clone(&self) -> Self {
        IntervalTree {
            raw: self.raw.clone(),
            attached: self.attached.clone(),
            intervals: self.intervals.clone(),
            cmp: self.cmp.clone(),
        }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for IntervalTree<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalTree").field("intervals", &self.intervals).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::comparator::Reverse;
    use proptest::prelude::*;

    fn sorted_hits<K: Ord + Clone, C: Comparator<K>>(tree: &IntervalTree<K, C>, point: &K) -> Vec<(K, K)> {
        let mut hits: Vec<_> = tree
            .find_intervals(point)
            .into_iter()
            .map(|interval| (interval.min.clone(), interval.max.clone()))
            .collect();
        hits.sort();
        hits
    }

    #[test]
    fn empty_tree() {
        let tree: IntervalTree<i32> = IntervalTree::new([]).unwrap();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert!(tree.find_intervals(&3).is_empty());
    }

    #[test]
    fn inverted_interval() {
        let result = IntervalTree::new([Interval::new(1, 4), Interval::new(6, 5)]);
        assert_eq!(result.unwrap_err(), TreeError::InvertedInterval);
    }

    #[test]
    fn attached_lists_are_ordered() {
        let tree = IntervalTree::new([(0, 9), (3, 5), (1, 12), (4, 4), (2, 7)].map(Interval::from)).unwrap();
        for node in &tree.attached {
            let mins: Vec<_> = node.by_min.iter().map(|&i| tree.intervals[i].min).collect();
            assert!(mins.is_sorted());
            let maxes: Vec<_> = node.by_max.iter().map(|&i| tree.intervals[i].max).collect();
            assert!(maxes.iter().rev().is_sorted());
            assert_eq!(node.by_min.len(), node.by_max.len());
        }
        let total: usize = tree.attached.iter().map(|node| node.by_min.len()).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn point_intervals_and_duplicates() {
        let tree = IntervalTree::new([(5, 5), (5, 5), (1, 5)].map(Interval::from)).unwrap();
        assert_eq!(sorted_hits(&tree, &5), [(1, 5), (5, 5), (5, 5)]);
        assert_eq!(sorted_hits(&tree, &4), [(1, 5)]);
        assert!(sorted_hits(&tree, &6).is_empty());
    }

    #[test]
    fn reversed_order() {
        // Under the reversed order an interval runs from its larger end to its smaller one.
        let tree = IntervalTree::with_comparator([(9, 3), (4, 0)].map(Interval::from), Reverse(NaturalOrder)).unwrap();
        assert_eq!(sorted_hits(&tree, &4), [(4, 0), (9, 3)]);
        assert_eq!(sorted_hits(&tree, &8), [(9, 3)]);
        assert!(IntervalTree::with_comparator([Interval::new(0, 4)], Reverse(NaturalOrder)).is_err());
    }

    proptest! {
        #[test]
        fn matches_linear_scan(
            raw in prop::collection::vec((0i32..50, 0i32..20), 0..40),
            points in prop::collection::vec(-3i32..75, 1..20),
        ) {
            let intervals: Vec<_> = raw.iter().map(|&(min, len)| Interval::new(min, min + len)).collect();
            let tree = IntervalTree::new(intervals.iter().copied()).unwrap();

            for point in points {
                let mut expected: Vec<_> = intervals
                    .iter()
                    .filter(|interval| interval.contains_closed(&point, &NaturalOrder))
                    .map(|interval| (interval.min, interval.max))
                    .collect();
                expected.sort();
                prop_assert_eq!(sorted_hits(&tree, &point), expected);
            }
        }
    }
}
