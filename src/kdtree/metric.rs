use std::cmp::Ordering;
use std::ops::Deref;

use crate::bits::DirtyBits;
use crate::error::Result;
use crate::kdtree::KdTree;
use crate::r#type::MetricItem;

/// A [`KdTree`] over items that carry per-axis scalar coordinates, adding
/// Euclidean nearest-neighbor search.
///
/// Derefs to [`KdTree`], so every query of the plain tree is available on
/// the metric tree as well.
///
/// ## Example
///
/// ```
/// use dim_index::kdtree::MetricKdTree;
///
/// let tree = MetricKdTree::new(2, vec![[0.0, 0.0], [10.0, 10.0], [3.0, 4.0]]).unwrap();
/// let (neighbor, squared) = tree.nearest_neighbor(&[1.0, 1.0]);
/// assert_eq!(neighbor, &[0.0, 0.0]);
/// assert_eq!(squared, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct MetricKdTree<T: MetricItem> {
    pub(crate) inner: KdTree<T>,
}

impl<T: MetricItem> MetricKdTree<T> {
    /// Build a metric tree over `dim` dimensions from a non-empty
    /// collection.
    ///
    /// ## Errors
    ///
    /// - If `dim` is zero.
    /// - If `values` is empty.
    pub fn new(dim: usize, values: Vec<T>) -> Result<Self> {
        Ok(Self {
            inner: KdTree::new(dim, values)?,
        })
    }

    /// The stored item of minimum Euclidean squared distance to `q`,
    /// together with that squared distance.
    ///
    /// Ties go to the first item found by the traversal.
    pub fn nearest_neighbor(&self, q: &T) -> (&T, f64) {
        let mut best = None;
        nearest_in(&self.inner, q, &mut best);
        // the tree is never empty, so the search always finds a neighbor
        best.unwrap()
    }
}

impl<T: MetricItem> Deref for MetricKdTree<T> {
    type Target = KdTree<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Fold the nearest neighbor of `q` within `tree` into `best`, which may
/// already hold the best candidate from another tree. Only a strictly
/// closer item replaces the current best.
pub(crate) fn nearest_in<'a, T: MetricItem>(
    tree: &'a KdTree<T>,
    q: &T,
    best: &mut Option<(&'a T, f64)>,
) {
    nearest(
        &tree.values,
        &tree.dirty,
        tree.dim,
        q,
        0,
        tree.values.len() - 1,
        0,
        best,
    );
}

#[allow(clippy::too_many_arguments)]
fn nearest<'a, T: MetricItem>(
    values: &'a [T],
    dirty: &DirtyBits,
    dim: usize,
    q: &T,
    left: usize,
    right: usize,
    axis: usize,
    best: &mut Option<(&'a T, f64)>,
) {
    let m = (left + right) >> 1;
    let mid = &values[m];
    let sq = squared_distance(q, mid, dim);
    if best.map_or(true, |(_, b)| sq < b) {
        *best = Some((mid, sq));
    }

    let c = q.cmp_dim(mid, axis);
    let next_axis = (axis + 1) % dim;

    // descend the natural side first, then enter the far side only if the
    // splitting plane is closer than the current best
    let mut was_right = false;
    let mut force_left = false;
    if c != Ordering::Less && m < right {
        nearest(values, dirty, dim, q, m + 1, right, next_axis, best);
        was_right = true;
        if best.map_or(true, |(_, b)| plane_distance(q, mid, axis) < b) {
            force_left = true;
        }
    }
    if c == Ordering::Less || (c == Ordering::Equal && dirty.get(m)) || force_left {
        if m > left {
            nearest(values, dirty, dim, q, left, m - 1, next_axis, best);
        }
        if !was_right
            && best.map_or(true, |(_, b)| plane_distance(q, mid, axis) < b)
            && m < right
        {
            nearest(values, dirty, dim, q, m + 1, right, next_axis, best);
        }
    }
}

/// Euclidean squared distance over the first `dim` axes.
#[inline]
pub(crate) fn squared_distance<T: MetricItem>(a: &T, b: &T, dim: usize) -> f64 {
    let mut sum = 0.0;
    for d in 0..dim {
        let delta = a.coord(d) - b.coord(d);
        sum += delta * delta;
    }
    sum
}

/// Squared perpendicular distance from `q` to the splitting hyperplane
/// through `mid` on `axis`.
#[inline]
fn plane_distance<T: MetricItem>(q: &T, mid: &T, axis: usize) -> f64 {
    let delta = mid.coord(axis) - q.coord(axis);
    delta * delta
}
