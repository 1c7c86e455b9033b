//! Leaf-oriented binary search trees for Rust.
//!
//! Every tree in this crate stores its entries in the leaves. Internal nodes only route
//! searches: each carries a separator key equal to the smallest key of its right subtree,
//! so a search for `key` goes left exactly when `key < separator`. All balancing
//! disciplines share one node substrate and one set of rotations; they differ only in
//! the bookkeeping each node carries and in when they rotate.
//!
//! - [`AvlTree`] - height-balanced, with O(log n) [`join`](AvlTree::join) and [`split`](AvlTree::split)
//! - [`BbTree`] - weight-balanced, with configurable [`WeightBalance`] parameters
//! - [`RbTree`] - red-black with top-down insertion (removal is not supported)
//! - [`IntervalTree`] - static set of closed intervals answering stabbing queries
//! - [`SegmentTree`] - static set of half-open intervals answering point coverage queries
//!
//! # Example
//!
//! ```
//! use leaf_tree::{AvlTree, Interval, IntervalTree};
//!
//! let mut tree = AvlTree::new();
//! tree.insert("carol", 92);
//! tree.insert("alice", 100);
//! tree.insert("bob", 85);
//! assert_eq!(tree.find(&"bob"), Some(&85));
//! assert_eq!(tree.keys().copied().collect::<Vec<_>>(), ["alice", "bob", "carol"]);
//!
//! // Entries live in the leaves; the root routes.
//! let root = tree.root().unwrap();
//! assert_eq!(root.value(), None);
//!
//! let shifts = IntervalTree::new([Interval::new(9, 17), Interval::new(12, 20)]).unwrap();
//! assert_eq!(shifts.find_intervals(&18).len(), 1);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Custom orders** - Every collection takes a [`Comparator`]; closures work too
//! - **Stable node identity** - Rotations swap keys instead of moving nodes, so the node
//!   at a given position in the tree keeps its identity
//!
//! # Implementation
//!
//! Nodes live in a per-tree arena and refer to each other through compact handles.
//! Children are owned by the arena; parent links are plain handles used for walking
//! back up during rebalancing.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod raw;

pub mod avl_tree;
pub mod bb_tree;
pub mod comparator;
pub mod dot;
pub mod error;
pub mod interval;
pub mod interval_tree;
pub mod iter;
pub mod node_ref;
pub mod rb_tree;
pub mod search_tree;
pub mod segment_tree;

pub use avl_tree::{AvlTree, Height};
pub use bb_tree::{BbTree, Weight, WeightBalance};
pub use comparator::{Comparator, NaturalOrder, Reverse};
pub use error::TreeError;
pub use interval::Interval;
pub use interval_tree::IntervalTree;
pub use node_ref::NodeRef;
pub use rb_tree::{Color, RbTree};
pub use search_tree::SearchTree;
pub use segment_tree::{Endpoint, SegmentTree};
