use alloc::vec::Vec;
use log::debug;

use super::handle::Handle;
use super::node::Metadata;
use super::raw_tree::RawTree;

impl<K: Clone, V, M: Metadata> RawTree<K, V, M> {
    /// Builds a tree bottom-up from pairs already sorted by strictly increasing key.
    ///
    /// Adjacent subtrees are paired level by level; each new internal node takes the
    /// smallest key of its right subtree, and an odd subtree at the end of a level is
    /// carried up unchanged. The result has depth `ceil(log2 n)` and is built without
    /// a single rotation or comparison.
    pub(crate) fn make_tree<I>(sorted: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let sorted = sorted.into_iter();
        let mut tree = RawTree::with_capacity(sorted.size_hint().0);

        // Each entry is a subtree root and the smallest key below it.
        let mut level: Vec<(Handle, K)> = sorted
            .map(|(key, value)| (tree.create_leaf(key.clone(), value), key))
            .collect();
        let len = level.len();

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            let mut entries = level.into_iter();
            while let Some((left, min)) = entries.next() {
                match entries.next() {
                    Some((right, separator)) => next.push((tree.create_internal(separator, left, right), min)),
                    None => next.push((left, min)),
                }
            }
            level = next;
        }

        tree.set_root(level.pop().map(|(root, _)| root));
        tree.set_len(len);
        debug!("assembled static tree over {len} keys");
        tree
    }
}
