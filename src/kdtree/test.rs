use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bits::DirtyBits;
use crate::kdtree::{KdTree, KdTreeBuilder, MetricKdTree};
use crate::r#type::IndexableItem;
use crate::DimIndexError;

/// A seeded point cloud with duplicate rows injected, so equality searches
/// and the dirty bits have real work to do.
fn points() -> Vec<[i32; 2]> {
    let mut rng = StdRng::seed_from_u64(35);
    let mut points: Vec<[i32; 2]> = (0..48)
        .map(|_| [rng.gen_range(0..100), rng.gen_range(0..100)])
        .collect();
    points.push(points[5]);
    points.push(points[5]);
    points.push(points[17]);
    points.push(points[30]);
    points
}

fn make_index() -> KdTree<[i32; 2]> {
    let points = points();
    let mut builder = KdTreeBuilder::with_capacity(2, points.len());
    for point in points {
        builder.add(point);
    }
    builder.finish().unwrap()
}

/// Recursively verify the k-d layout: every subtree window is partitioned
/// around its floor median on its axis, and the dirty bit records exactly
/// whether an equal-keyed item sits left of the median.
fn check_layout<T: IndexableItem>(tree: &KdTree<T>) {
    fn check<T: IndexableItem>(
        values: &[T],
        dirty: &DirtyBits,
        dim: usize,
        left: usize,
        right: usize,
        axis: usize,
    ) {
        let m = (left + right) >> 1;
        for i in left..m {
            assert_ne!(
                values[i].cmp_dim(&values[m], axis),
                Ordering::Greater,
                "left half leaks past the median"
            );
        }
        for i in m + 1..=right {
            assert_ne!(
                values[i].cmp_dim(&values[m], axis),
                Ordering::Less,
                "right half leaks past the median"
            );
        }

        let has_left_duplicate =
            (left..m).any(|i| values[i].cmp_dim(&values[m], axis) == Ordering::Equal);
        assert_eq!(dirty.get(m), has_left_duplicate, "dirty bit mismatch");

        let next_axis = (axis + 1) % dim;
        if m > left {
            check(values, dirty, dim, left, m - 1, next_axis);
        }
        if m < right {
            check(values, dirty, dim, m + 1, right, next_axis);
        }
    }

    check(
        &tree.values,
        &tree.dirty,
        tree.dim,
        0,
        tree.values.len() - 1,
        0,
    );
}

fn brute_range(
    points: &[[i32; 2]],
    lo: Option<[i32; 2]>,
    hi: Option<[i32; 2]>,
    hi_inclusive: bool,
) -> Vec<[i32; 2]> {
    let mut result: Vec<[i32; 2]> = points
        .iter()
        .copied()
        .filter(|p| {
            let ge_lo = lo.map_or(true, |lo| p[0] >= lo[0] && p[1] >= lo[1]);
            let le_hi = hi.map_or(true, |hi| {
                if hi_inclusive {
                    p[0] <= hi[0] && p[1] <= hi[1]
                } else {
                    p[0] < hi[0] && p[1] < hi[1]
                }
            });
            ge_lo && le_hi
        })
        .collect();
    result.sort();
    result
}

fn collect_range(
    tree: &KdTree<[i32; 2]>,
    lo: Option<[i32; 2]>,
    hi: Option<[i32; 2]>,
    hi_inclusive: bool,
) -> Vec<[i32; 2]> {
    let mut result = Vec::new();
    tree.for_each_in_range(lo.as_ref(), hi.as_ref(), hi_inclusive, |v| {
        result.push(*v);
        false
    });
    result.sort();
    result
}

#[test]
fn creates_an_index() {
    let tree = make_index();
    assert_eq!(tree.len(), points().len());
    assert_eq!(tree.dim(), 2);
    check_layout(&tree);
}

#[test]
fn builder_returns_insertion_indices() {
    let mut builder = KdTreeBuilder::new(2);
    assert_eq!(builder.add([1, 2]), 0);
    assert_eq!(builder.add([3, 4]), 1);
    assert_eq!(builder.add([1, 2]), 2);
    let tree = builder.finish().unwrap();
    assert_eq!(tree.len(), 3);
}

#[test]
fn rejects_zero_dimensions() {
    let result = KdTree::new(0, vec![[1, 2]]);
    assert!(matches!(result, Err(DimIndexError::InvalidArgument(_))));
}

#[test]
fn rejects_empty_input() {
    let result = KdTree::<[i32; 2]>::new(2, vec![]);
    assert!(matches!(result, Err(DimIndexError::EmptyConstruction)));
}

#[test]
fn finds_every_duplicate() {
    let tree = KdTree::new(1, vec![[5], [3], [3], [3], [1], [4], [3]]).unwrap();
    check_layout(&tree);

    assert_eq!(tree.get(&[3]).count(), 4);
    assert!(tree.contains(&[3]));
    assert!(!tree.contains(&[6]));

    let mut visited = 0;
    tree.for_each_in_range(Some(&[3]), Some(&[4]), true, |_| {
        visited += 1;
        false
    });
    assert_eq!(visited, 5);
}

#[test]
fn finds_duplicates_in_two_dimensions() {
    let fixture = points();
    let tree = KdTree::new(2, fixture.clone()).unwrap();

    // fixture[5] was injected twice, fixture[17] and fixture[30] once
    for key in [fixture[5], fixture[17], fixture[30], [100, 100]] {
        let expected = fixture.iter().filter(|p| **p == key).count();
        assert_eq!(tree.get(&key).count(), expected, "key {key:?}");
    }
    assert!(tree.get(&fixture[5]).count() >= 3);
}

#[test]
fn get_is_restartable() {
    let fixture = points();
    let tree = KdTree::new(2, fixture.clone()).unwrap();
    let key = fixture[5];
    let first: Vec<&[i32; 2]> = tree.get(&key).collect();
    let second: Vec<&[i32; 2]> = tree.get(&key).collect();
    assert_eq!(first, second);
    assert!(first.len() >= 3);
}

#[test]
fn range_on_a_degenerate_line() {
    let tree = KdTree::new(2, vec![[0, 0], [0, 1], [0, 2], [0, 3], [0, 4]]).unwrap();
    check_layout(&tree);

    let mut visited = 0;
    tree.for_each_in_range(Some(&[0, 1]), Some(&[0, 3]), true, |_| {
        visited += 1;
        false
    });
    assert_eq!(visited, 3);
}

#[test]
fn exclusive_upper_bound() {
    let tree = KdTree::new(1, vec![[1], [2], [3], [4], [5]]).unwrap();

    let mut inclusive = 0;
    tree.for_each_in_range(Some(&[2]), Some(&[4]), true, |_| {
        inclusive += 1;
        false
    });
    assert_eq!(inclusive, 3);

    let mut exclusive = 0;
    tree.for_each_in_range(Some(&[2]), Some(&[4]), false, |_| {
        exclusive += 1;
        false
    });
    assert_eq!(exclusive, 2);
}

#[test]
fn inverted_bounds_yield_nothing() {
    let tree = make_index();
    let canceled = tree.for_each_in_range(Some(&[50, 50]), Some(&[10, 90]), true, |_| {
        panic!("no item is in an inverted range");
    });
    assert!(!canceled);
}

#[test]
fn range_search() {
    let tree = make_index();
    let fixture = points();

    let cases = [
        (Some([20, 30]), Some([50, 70]), true),
        (Some([20, 30]), Some([50, 70]), false),
        (None, Some(fixture[5]), true),
        (Some(fixture[5]), None, true),
        (None, None, true),
        (Some(fixture[17]), Some(fixture[17]), true),
    ];
    for (lo, hi, hi_inclusive) in cases {
        assert_eq!(
            collect_range(&tree, lo, hi, hi_inclusive),
            brute_range(&fixture, lo, hi, hi_inclusive),
            "range {lo:?}..{hi:?} inclusive={hi_inclusive}"
        );
    }
}

#[test]
fn random_range_search_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(7);
    // a dense universe so duplicates and shared axis values are common
    let fixture: Vec<[i32; 2]> = (0..200)
        .map(|_| [rng.gen_range(0..12), rng.gen_range(0..12)])
        .collect();
    let tree = KdTree::new(2, fixture.clone()).unwrap();
    check_layout(&tree);

    for _ in 0..50 {
        let lo = [rng.gen_range(0..12), rng.gen_range(0..12)];
        let hi = [rng.gen_range(0..12), rng.gen_range(0..12)];
        let hi_inclusive = rng.gen_bool(0.5);
        assert_eq!(
            collect_range(&tree, Some(lo), Some(hi), hi_inclusive),
            brute_range(&fixture, Some(lo), Some(hi), hi_inclusive),
        );
    }
}

#[test]
fn round_trip_preserves_the_multiset() {
    let fixture = points();
    let tree = KdTree::new(2, fixture.clone()).unwrap();

    let mut enumerated = collect_range(&tree, None, None, true);
    let mut expected = fixture;
    enumerated.sort();
    expected.sort();
    assert_eq!(enumerated, expected);
}

#[test]
fn cancellation_stops_the_traversal() {
    let tree = make_index();

    let mut seen = 0;
    let canceled = tree.for_each(|_| {
        seen += 1;
        seen == 5
    });
    assert!(canceled);
    assert_eq!(seen, 5);

    let completed = tree.for_each(|_| false);
    assert!(!completed);
}

#[test]
fn cancellation_stops_equality_search() {
    let fixture = points();
    let tree = KdTree::new(2, fixture.clone()).unwrap();
    let mut seen = 0;
    let canceled = tree.for_each_equal(&fixture[5], |_| {
        seen += 1;
        true
    });
    assert!(canceled);
    assert_eq!(seen, 1);
}

fn brute_nearest(points: &[[f64; 2]], q: [f64; 2]) -> f64 {
    points
        .iter()
        .map(|p| {
            let dx = q[0] - p[0];
            let dy = q[1] - p[1];
            dx * dx + dy * dy
        })
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn nearest_neighbor_fixture() {
    let tree = MetricKdTree::new(2, vec![[0.0, 0.0], [10.0, 10.0], [3.0, 4.0]]).unwrap();
    let (neighbor, squared) = tree.nearest_neighbor(&[1.0, 1.0]);
    assert_eq!(neighbor, &[0.0, 0.0]);
    assert_eq!(squared, 2.0);

    // queries of the plain tree are available through deref
    assert!(tree.contains(&[3.0, 4.0]));
    assert_eq!(tree.len(), 3);
}

#[test]
fn nearest_neighbor_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(23);
    let fixture: Vec<[f64; 2]> = (0..150)
        .map(|_| [rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0)])
        .collect();
    let tree = MetricKdTree::new(2, fixture.clone()).unwrap();

    for _ in 0..50 {
        let q = [rng.gen_range(-120.0..120.0), rng.gen_range(-120.0..120.0)];
        let (_, squared) = tree.nearest_neighbor(&q);
        assert_eq!(squared, brute_nearest(&fixture, q));
    }
}

#[test]
fn nearest_neighbor_with_duplicates() {
    let fixture = vec![[2.0, 2.0], [2.0, 2.0], [2.0, 5.0], [7.0, 2.0], [2.0, 2.0]];
    let tree = MetricKdTree::new(2, fixture).unwrap();

    let (neighbor, squared) = tree.nearest_neighbor(&[2.0, 2.0]);
    assert_eq!(neighbor, &[2.0, 2.0]);
    assert_eq!(squared, 0.0);

    let (neighbor, squared) = tree.nearest_neighbor(&[2.0, 4.0]);
    assert_eq!(neighbor, &[2.0, 5.0]);
    assert_eq!(squared, 1.0);
}
