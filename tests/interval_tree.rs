mod common;

use leaf_tree::{Interval, IntervalTree, TreeError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use common::{check_order, init_logger};

fn hits(tree: &IntervalTree<i64>, point: i64) -> Vec<Interval<i64>> {
    let mut hits: Vec<_> = tree.find_intervals(&point).into_iter().copied().collect();
    hits.sort();
    hits
}

#[test]
fn overlapping_windows() {
    init_logger();
    let tree = IntervalTree::new((0..10).map(|j| Interval::new(j, j + 5))).unwrap();
    assert_eq!(tree.len(), 10);

    let found = hits(&tree, 7);
    assert_eq!(found.len(), 6);
    assert_eq!(found, (2..=7).map(|j| Interval::new(j, j + 5)).collect::<Vec<_>>());

    // Closed at both ends.
    assert_eq!(hits(&tree, 0), [Interval::new(0, 5)]);
    assert_eq!(hits(&tree, 14), [Interval::new(9, 14)]);
    assert!(hits(&tree, 15).is_empty());
    assert!(hits(&tree, -1).is_empty());
}

#[test]
fn skeleton_is_a_balanced_endpoint_tree() {
    let tree = IntervalTree::new((0..32).map(|j| Interval::new(2 * j, 2 * j + 1))).unwrap();
    let root = tree.root().unwrap();
    assert_eq!(check_order(root), (0, 63));
    assert_eq!(root.size(), 64);
    assert_eq!(tree.depth(), 6);
}

#[test]
fn inverted_intervals_are_rejected() {
    assert_eq!(
        IntervalTree::new([Interval::new(3, 1)]).unwrap_err(),
        TreeError::InvertedInterval
    );
}

#[test]
fn works_over_strings() {
    let tree = IntervalTree::new([
        Interval::new("apple", "cherry"),
        Interval::new("banana", "fig"),
        Interval::new("kiwi", "plum"),
    ])
    .unwrap();
    let mut found: Vec<_> = tree.find_intervals(&"coconut").into_iter().map(|i| i.min).collect();
    found.sort_unstable();
    assert_eq!(found, ["banana"]);
    assert_eq!(tree.find_intervals(&"cherry").len(), 2);
}

proptest! {
    #[test]
    fn stabbing_matches_linear_scan(
        raw in proptest::collection::vec((-100i64..100, 0i64..40), 0..200),
        points in proptest::collection::vec(-110i64..150, 1..50),
    ) {
        let intervals: Vec<_> = raw.iter().map(|&(min, len)| Interval::new(min, min + len)).collect();
        let tree = IntervalTree::new(intervals.clone()).unwrap();

        for point in points {
            let mut expected: Vec<_> = intervals
                .iter()
                .filter(|i| i.min <= point && point <= i.max)
                .copied()
                .collect();
            expected.sort();
            prop_assert_eq!(hits(&tree, point), expected);
        }
    }
}
