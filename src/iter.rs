//! Iterators shared by the balanced trees.
//!
//! All of them walk the leaves in key order. The `M` parameter is the metadata
//! type of the tree being iterated and never shows up in the items.

use core::fmt;
use core::iter::FusedIterator;

use crate::comparator::Comparator;
use crate::raw::{Leaves, RawTree};

impl<K, V, M: Copy> RawTree<K, V, M> {
    pub(crate) fn iter(&self) -> Iter<'_, K, V, M> {
        Iter {
            inner: self.leaves(),
            remaining: self.len(),
        }
    }

    pub(crate) fn range<C: Comparator<K>>(&self, min: &K, max: &K, cmp: &C) -> Range<'_, K, V, M> {
        Range {
            inner: self
                .leaf_range(min, max, cmp)
                .map(|(first, last)| self.leaves_between(first, last)),
        }
    }
}

/// An iterator over the entries of a tree, sorted by key.
///
/// Created by the `iter` method of each balanced tree.
pub struct Iter<'a, K, V, M> {
    pub(crate) inner: Leaves<'a, K, V, M>,
    pub(crate) remaining: usize,
}

impl<'a, K, V, M: Copy> Iterator for Iter<'a, K, V, M> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, M: Copy> DoubleEndedIterator for Iter<'_, K, V, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.inner.next_back()
    }
}

impl<K, V, M: Copy> ExactSizeIterator for Iter<'_, K, V, M> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, M: Copy> FusedIterator for Iter<'_, K, V, M> {}

impl<K, V, M> Clone for Iter<'_, K, V, M> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K, V, M> fmt::Debug for Iter<'_, K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

/// An iterator over the keys of a tree, in order.
pub struct Keys<'a, K, V, M> {
    pub(crate) inner: Iter<'a, K, V, M>,
}

impl<'a, K, V, M: Copy> Iterator for Keys<'a, K, V, M> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, M: Copy> DoubleEndedIterator for Keys<'_, K, V, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V, M: Copy> ExactSizeIterator for Keys<'_, K, V, M> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, M: Copy> FusedIterator for Keys<'_, K, V, M> {}

impl<K, V, M> Clone for Keys<'_, K, V, M> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V, M> fmt::Debug for Keys<'_, K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys").field("remaining", &self.inner.remaining).finish()
    }
}

/// An iterator over the values of a tree, in key order.
pub struct Values<'a, K, V, M> {
    pub(crate) inner: Iter<'a, K, V, M>,
}

impl<'a, K, V, M: Copy> Iterator for Values<'a, K, V, M> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, M: Copy> DoubleEndedIterator for Values<'_, K, V, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V, M: Copy> ExactSizeIterator for Values<'_, K, V, M> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, M: Copy> FusedIterator for Values<'_, K, V, M> {}

impl<K, V, M> Clone for Values<'_, K, V, M> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V, M> fmt::Debug for Values<'_, K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values").field("remaining", &self.inner.remaining).finish()
    }
}

/// An iterator over the entries whose keys fall within a closed range.
///
/// Created by the `find_range` method of each balanced tree.
pub struct Range<'a, K, V, M> {
    pub(crate) inner: Option<Leaves<'a, K, V, M>>,
}

impl<'a, K, V, M: Copy> Iterator for Range<'a, K, V, M> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next()
    }
}

impl<K, V, M: Copy> DoubleEndedIterator for Range<'_, K, V, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next_back()
    }
}

impl<K, V, M: Copy> FusedIterator for Range<'_, K, V, M> {}

impl<K, V, M> Clone for Range<'_, K, V, M> {
    fn clone(&self) -> Self {
        Range {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V, M> fmt::Debug for Range<'_, K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Range").field("exhausted", &self.inner.is_none()).finish()
    }
}
