//! Static segment trees answering point coverage queries over half-open intervals.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use log::debug;
use smallvec::SmallVec;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::TreeError;
use crate::interval::{Interval, Span};
use crate::node_ref::NodeRef;
use crate::raw::{Handle, RawTree};

/// A key of the segment tree skeleton: an interval end, or a point below every key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Endpoint<K> {
    /// Smaller than every key, so the leftmost elementary range is unbounded below.
    Bottom,
    Value(K),
}

impl<K> Endpoint<K> {
    /// Returns the key, or `None` for [`Endpoint::Bottom`].
    pub fn value(&self) -> Option<&K> {
        match self {
            Endpoint::Bottom => None,
            Endpoint::Value(key) => Some(key),
        }
    }
}

/// Extends a key comparator to endpoints.
struct EndpointOrder<'a, C>(&'a C);

impl<K, C: Comparator<K>> Comparator<Endpoint<K>> for EndpointOrder<'_, C> {
    fn compare(&self, lhs: &Endpoint<K>, rhs: &Endpoint<K>) -> Ordering {
        match (lhs, rhs) {
            (Endpoint::Bottom, Endpoint::Bottom) => Ordering::Equal,
            (Endpoint::Bottom, Endpoint::Value(_)) => Ordering::Less,
            (Endpoint::Value(_), Endpoint::Bottom) => Ordering::Greater,
            (Endpoint::Value(lhs), Endpoint::Value(rhs)) => self.0.compare(lhs, rhs),
        }
    }
}

/// Orders a key against an endpoint.
fn compare_key<K, C: Comparator<K>>(cmp: &C, key: &K, endpoint: &Endpoint<K>) -> Ordering {
    match endpoint {
        Endpoint::Bottom => Ordering::Greater,
        Endpoint::Value(value) => cmp.compare(key, value),
    }
}

/// A set of half-open intervals `[min, max)`, built once and queried by point.
///
/// Every node of the skeleton covers an elementary range between consecutive endpoints
/// (or a union of them). An interval is stored at the highest nodes whose whole range
/// it covers, so a query collects each covering interval exactly once on its way
/// from the root to a leaf.
///
/// # Examples
///
/// ```
/// use leaf_tree::{Interval, SegmentTree};
///
/// let tree = SegmentTree::new([Interval::new(1, 5), Interval::new(3, 8)]).unwrap();
/// assert_eq!(tree.find_intervals(&3).len(), 2);
/// assert_eq!(tree.find_intervals(&5), [&Interval::new(3, 8)]);
/// assert!(tree.find_intervals(&8).is_empty());
/// ```
pub struct SegmentTree<K, C = NaturalOrder> {
    raw: RawTree<Endpoint<K>, (), ()>,
    /// Indices into `intervals`, per node.
    coverage: Vec<Vec<usize>>,
    intervals: Vec<Interval<K>>,
    cmp: C,
}

impl<K: Ord + Clone> SegmentTree<K> {
    /// Builds a tree over `intervals`, ordered by `K`'s [`Ord`] implementation.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvertedInterval`] if some interval has `min > max`.
    pub fn new<I>(intervals: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = Interval<K>>,
    {
        SegmentTree::with_comparator(intervals, NaturalOrder)
    }
}

impl<K: Clone, C: Comparator<K>> SegmentTree<K, C> {
    /// Builds a tree over `intervals`, ordered by `cmp`.
    ///
    /// Empty intervals (`min == max`) are kept but never reported.
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

        let order = EndpointOrder(&cmp);
        let mut endpoints: Vec<Endpoint<K>> = intervals
            .iter()
            .flat_map(|interval| [Endpoint::Value(interval.min.clone()), Endpoint::Value(interval.max.clone())])
            .chain([Endpoint::Bottom])
            .collect();
        endpoints.sort_by(|a, b| order.compare(a, b));
        endpoints.dedup_by(|a, b| order.is_eq(a, b));
        let raw = RawTree::make_tree(endpoints.into_iter().map(|key| (key, ())));

        let mut coverage = vec![Vec::new(); raw.node_count()];
        if let Some(root) = raw.root() {
            for (index, interval) in intervals.iter().enumerate() {
                for node in canonical_nodes(&raw, root, interval, &cmp) {
                    coverage[node.to_index()].push(index);
                }
            }
        }

        debug!("built segment tree over {} intervals, {} endpoints", intervals.len(), raw.len());
        Ok(SegmentTree {
            raw,
            coverage,
            intervals,
            cmp,
        })
    }

    /// Returns every interval covering `point`, in no particular order.
    ///
    /// # Complexity
    ///
    /// O(log n + k) for k reported intervals.
    pub fn find_intervals(&self, point: &K) -> Vec<&Interval<K>> {
        let mut found = Vec::new();
        let mut current = self.raw.root();
        while let Some(node) = current {
            found.extend(self.coverage[node.to_index()].iter().map(|&index| &self.intervals[index]));
            current = self.raw.children(node).map(|(left, right)| {
                if compare_key(&self.cmp, point, self.raw.key(node)) == Ordering::Less {
                    left
                } else {
                    right
                }
            });
        }
        found
    }
}

impl<K, C> SegmentTree<K, C> {
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
    pub fn root(&self) -> Option<NodeRef<'_, Endpoint<K>, (), ()>> {
        NodeRef::root(&self.raw)
    }
}

/// Collects the highest nodes whose range lies within `[interval.min, interval.max)`.
fn canonical_nodes<K, C: Comparator<K>>(
    raw: &RawTree<Endpoint<K>, (), ()>,
    root: Handle,
    interval: &Interval<K>,
    cmp: &C,
) -> Vec<Handle> {
    let compare = |key: &K, endpoint: &Endpoint<K>| compare_key(cmp, key, endpoint);

    let mut nodes = Vec::new();
    let mut stack: SmallVec<[(Span<'_, Endpoint<K>>, Handle); 32]> = SmallVec::new();
    stack.push((Span::UNBOUNDED, root));
    while let Some((span, node)) = stack.pop() {
        if span.within(&interval.min, &interval.max, compare) {
            nodes.push(node);
        } else if span.overlaps(&interval.min, &interval.max, compare) {
            let (left, right) = raw.children(node).expect("a partially covered range is split further");
            let (left_span, right_span) = span.split_at(raw.key(node));
            stack.push((left_span, left));
            stack.push((right_span, right));
        }
    }
    nodes
}

impl<K: Clone, C: Clone> Clone for SegmentTree<K, C> {
    fn clone(&self) -> Self {
        SegmentTree {
            raw: self.raw.clone(),
            coverage: self.coverage.clone(),
            intervals: self.intervals.clone(),
            cmp: self.cmp.clone(),
        }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for SegmentTree<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentTree").field("intervals", &self.intervals).finish()
    }
}
