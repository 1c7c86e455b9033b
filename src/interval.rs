//! Intervals over an ordered key type.

use core::cmp::Ordering;

use crate::comparator::Comparator;
use crate::error::TreeError;

/// An interval between two keys.
///
/// Whether the ends are included depends on the structure storing it:
/// [`IntervalTree`](crate::IntervalTree) treats intervals as closed, `[min, max]`,
/// and [`SegmentTree`](crate::SegmentTree) as half-open, `[min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval<K> {
    pub min: K,
    pub max: K,
}

impl<K> Interval<K> {
    pub const fn new(min: K, max: K) -> Self {
        Interval { min, max }
    }

    /// Returns true if `min <= point <= max`.
    ///
    /// ```
    /// use leaf_tree::{Interval, NaturalOrder};
    ///
    /// let interval = Interval::new(2, 5);
    /// assert!(interval.contains_closed(&5, &NaturalOrder));
    /// assert!(!interval.contains_half_open(&5, &NaturalOrder));
    /// ```
    pub fn contains_closed<C: Comparator<K>>(&self, point: &K, cmp: &C) -> bool {
        cmp.is_le(&self.min, point) && cmp.is_le(point, &self.max)
    }

    /// Returns true if `min <= point < max`.
    pub fn contains_half_open<C: Comparator<K>>(&self, point: &K, cmp: &C) -> bool {
        cmp.is_le(&self.min, point) && cmp.is_lt(point, &self.max)
    }

    pub(crate) fn check<C: Comparator<K>>(&self, cmp: &C) -> Result<(), TreeError> {
        if cmp.is_lt(&self.max, &self.min) {
            Err(TreeError::InvertedInterval)
        } else {
            Ok(())
        }
    }
}

impl<K> From<(K, K)> for Interval<K> {
    fn from((min, max): (K, K)) -> Self {
        Interval { min, max }
    }
}

/// A half-open range `[lo, hi)` whose ends may be unbounded.
#[derive(Debug)]
pub(crate) struct Span<'a, K> {
    pub(crate) lo: Option<&'a K>,
    pub(crate) hi: Option<&'a K>,
}

impl<K> Clone for Span<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Span<'_, K> {}

impl<'a, K> Span<'a, K> {
    pub(crate) const UNBOUNDED: Self = Span { lo: None, hi: None };

    /// Splits the span at `key` into `[lo, key)` and `[key, hi)`.
    pub(crate) fn split_at(self, key: &'a K) -> (Self, Self) {
        (Span { lo: self.lo, hi: Some(key) }, Span { lo: Some(key), hi: self.hi })
    }

    /// Returns true if every point of this span lies in `[min, max)`.
    ///
    /// `compare(point, bound)` orders an interval end against a span end.
    pub(crate) fn within<P>(&self, min: &P, max: &P, compare: impl Fn(&P, &K) -> Ordering) -> bool {
        match (self.lo, self.hi) {
            (Some(lo), Some(hi)) => compare(min, lo) != Ordering::Greater && compare(max, hi) != Ordering::Less,
            _ => false,
        }
    }

    /// Returns true if this span and `[min, max)` share at least one point.
    pub(crate) fn overlaps<P>(&self, min: &P, max: &P, compare: impl Fn(&P, &K) -> Ordering) -> bool {
        self.hi.is_none_or(|hi| compare(min, hi) == Ordering::Less)
            && self.lo.is_none_or(|lo| compare(max, lo) == Ordering::Greater)
    }
}
