//! Structural checks shared by the integration tests.
//!
//! Everything here walks the public [`NodeRef`] view, so the checks see the trees
//! the same way a user of the crate does.

#![allow(dead_code)]

use std::fmt::Debug;
use std::sync::Once;

use leaf_tree::{Color, Height, NodeRef, Weight, WeightBalance};
use simplelog::{Config, LevelFilter, TestLogger};

static LOGGER: Once = Once::new();

/// Routes the crate's `log` output through the test harness.
pub fn init_logger() {
    LOGGER.call_once(|| {
        let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    });
}

/// Checks the leaf-oriented search tree shape below `node` and returns its
/// smallest and largest key.
///
/// Leaves carry values and internal nodes do not. Every child points back at its
/// parent. An internal key is greater than every key on its left and equal to the
/// smallest key on its right.
pub fn check_order<K: Ord + Clone + Debug, V, M: Copy>(node: NodeRef<'_, K, V, M>) -> (K, K) {
    match node.children() {
        None => {
            assert!(node.value().is_some(), "leaf {:?} has no value", node.key());
            (node.key().clone(), node.key().clone())
        }
        Some((left, right)) => {
            assert!(node.value().is_none(), "internal node {:?} has a value", node.key());
            assert!(left.parent() == Some(node), "broken parent link below {:?}", node.key());
            assert!(right.parent() == Some(node), "broken parent link below {:?}", node.key());
            let (min, left_max) = check_order(left);
            let (right_min, max) = check_order(right);
            assert!(left_max < *node.key(), "{left_max:?} on the left of {:?}", node.key());
            assert_eq!(right_min, *node.key(), "separator is not the smallest key on its right");
            (min, max)
        }
    }
}

/// Checks heights and the AVL balance below `node`, returning its height.
pub fn check_avl<K, V>(node: NodeRef<'_, K, V, Height>) -> u32 {
    let height = match node.children() {
        None => 0,
        Some((left, right)) => {
            let (left, right) = (check_avl(left), check_avl(right));
            assert!(left.abs_diff(right) <= 1, "unbalanced: {left} vs {right}");
            1 + left.max(right)
        }
    };
    assert_eq!(node.meta().get(), height);
    height
}

/// Checks weights and the weight balance below `node`, returning its weight.
pub fn check_bb<K, V>(node: NodeRef<'_, K, V, Weight>, balance: WeightBalance) -> u32 {
    let weight = match node.children() {
        None => 1,
        Some((left, right)) => {
            let (left, right) = (check_bb(left, balance), check_bb(right, balance));
            let total = f64::from(left + right);
            assert!(f64::from(left) / total >= balance.alpha(), "left share too small: {left}/{total}");
            assert!(f64::from(right) / total >= balance.alpha(), "right share too small: {right}/{total}");
            left + right
        }
    };
    assert_eq!(node.meta().get(), weight);
    weight
}

/// Checks the red-black coloring below the root `node`, returning its black height.
pub fn check_rb<K, V>(node: NodeRef<'_, K, V, Color>) -> usize {
    assert_eq!(node.meta(), Color::Black, "the root is red");
    black_height(node)
}

fn black_height<K, V>(node: NodeRef<'_, K, V, Color>) -> usize {
    let below = match node.children() {
        None => 0,
        Some((left, right)) => {
            if node.meta() == Color::Red {
                assert_eq!(left.meta(), Color::Black, "red node with a red child");
                assert_eq!(right.meta(), Color::Black, "red node with a red child");
            }
            let (left, right) = (black_height(left), black_height(right));
            assert_eq!(left, right, "black heights differ");
            left
        }
    };
    below + usize::from(node.meta() == Color::Black)
}
