use std::ops::{Deref, DerefMut};

use crate::bkdtree::BkdTree;
use crate::error::Result;
use crate::kdtree::{nearest_in, squared_distance};
use crate::r#type::MetricItem;

/// A [`BkdTree`] over items that carry per-axis scalar coordinates, adding
/// Euclidean nearest-neighbor search.
///
/// Derefs to [`BkdTree`], so inserts and every query of the plain growing
/// tree are available on the metric tree as well.
///
/// ## Example
///
/// ```
/// use dim_index::bkdtree::MetricBkdTree;
///
/// let mut tree = MetricBkdTree::with_block_size(2, 2).unwrap();
/// for point in [[0.0, 0.0], [5.0, 5.0], [1.0, 1.0], [4.0, 4.0]] {
///     tree.insert(point).unwrap();
/// }
///
/// let (neighbor, squared) = tree.nearest_neighbor(&[0.5, 0.5]).unwrap();
/// assert_eq!(neighbor, &[0.0, 0.0]);
/// assert_eq!(squared, 0.5);
/// ```
///
/// `(0, 0)` and `(1, 1)` tie at squared distance `0.5`; the slots are
/// searched before the base buffer, so the frozen `(0, 0)` is found first.
#[derive(Debug)]
pub struct MetricBkdTree<T: MetricItem> {
    pub(crate) inner: BkdTree<T>,
}

impl<T: MetricItem> MetricBkdTree<T> {
    /// Create an empty metric tree over `dim` dimensions with the default
    /// block size.
    ///
    /// ## Errors
    ///
    /// - If `dim` is zero.
    pub fn new(dim: usize) -> Result<Self> {
        Ok(Self {
            inner: BkdTree::new(dim)?,
        })
    }

    /// Create an empty metric tree over `dim` dimensions with the provided
    /// block size.
    ///
    /// ## Errors
    ///
    /// - If `dim` is zero.
    /// - If `block_size` is less than 2.
    pub fn with_block_size(dim: usize, block_size: usize) -> Result<Self> {
        Ok(Self {
            inner: BkdTree::with_block_size(dim, block_size)?,
        })
    }

    /// The stored item of minimum Euclidean squared distance to `q`,
    /// together with that squared distance, or `None` when the tree is
    /// empty.
    ///
    /// One best is maintained across every occupied slot and the base
    /// buffer; ties go to the first item found.
    pub fn nearest_neighbor(&self, q: &T) -> Option<(&T, f64)> {
        let mut best = None;
        for tree in self.inner.slots.iter().flatten() {
            nearest_in(tree, q, &mut best);
        }
        for value in &self.inner.base {
            let sq = squared_distance(q, value, self.inner.dim);
            if best.map_or(true, |(_, b)| sq < b) {
                best = Some((value, sq));
            }
        }
        best
    }
}

impl<T: MetricItem> Deref for MetricBkdTree<T> {
    type Target = BkdTree<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: MetricItem> DerefMut for MetricBkdTree<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
