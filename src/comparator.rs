//! Total orders over keys.
//!
//! Every collection in this crate is parameterized by a [`Comparator`]. The
//! default, [`NaturalOrder`], defers to [`Ord`]; any closure
//! `Fn(&K, &K) -> Ordering` is a comparator as well.
//!
//! A comparator must be a strict total order: `compare(a, a)` is `Equal`, it is
//! antisymmetric and transitive. The behavior of a collection driven by a
//! comparator that violates this is not specified, but it stays memory safe.

use core::cmp::Ordering;

/// A total order over `K`.
///
/// # Examples
///
/// ```
/// use core::cmp::Ordering;
/// use leaf_tree::{AvlTree, Comparator};
///
/// // Order strings by length first, then lexicographically.
/// let by_length = |a: &&str, b: &&str| a.len().cmp(&b.len()).then_with(|| a.cmp(b));
/// assert_eq!(by_length.compare(&"ab", &"b"), Ordering::Greater);
///
/// let mut tree = AvlTree::with_comparator(by_length);
/// tree.insert("ccc", 3);
/// tree.insert("a", 1);
/// tree.insert("bb", 2);
/// assert_eq!(tree.keys().copied().collect::<Vec<_>>(), ["a", "bb", "ccc"]);
/// ```
pub trait Comparator<K: ?Sized> {
    /// Compares `lhs` against `rhs`.
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;

    /// Returns true if `lhs < rhs`.
    #[inline]
    fn is_lt(&self, lhs: &K, rhs: &K) -> bool {
        self.compare(lhs, rhs) == Ordering::Less
    }

    /// Returns true if `lhs <= rhs`.
    #[inline]
    fn is_le(&self, lhs: &K, rhs: &K) -> bool {
        self.compare(lhs, rhs) != Ordering::Greater
    }

    /// Returns true if `lhs == rhs`.
    #[inline]
    fn is_eq(&self, lhs: &K, rhs: &K) -> bool {
        self.compare(lhs, rhs) == Ordering::Equal
    }
}

/// The order given by the key's [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

/// Reverses the order of the wrapped comparator.
///
/// # Examples
///
/// ```
/// use leaf_tree::{AvlTree, NaturalOrder, Reverse};
///
/// let mut tree = AvlTree::with_comparator(Reverse(NaturalOrder));
/// tree.extend([(1, 'a'), (3, 'c'), (2, 'b')]);
/// assert_eq!(tree.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Reverse<C>(pub C);

impl<K: ?Sized, C: Comparator<K>> Comparator<K> for Reverse<C> {
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        self.0.compare(rhs, lhs)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        self(lhs, rhs)
    }
}
