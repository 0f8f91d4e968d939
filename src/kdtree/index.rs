use std::cmp::Ordering;

use crate::bits::DirtyBits;
use crate::error::{DimIndexError, Result};
use crate::kdtree::builder::kd_sort;
use crate::kdtree::traversal::Matches;
use crate::r#type::IndexableItem;

/// An immutable k-d tree.
///
/// Usually this will be created via a
/// [`KdTreeBuilder`][crate::kdtree::KdTreeBuilder] or directly from a
/// collection with [`KdTree::new`]. The tree is read-only after
/// construction; duplicates are preserved and found again by every query.
#[derive(Debug, Clone, PartialEq)]
pub struct KdTree<T: IndexableItem> {
    pub(crate) dim: usize,
    /// Items reordered in place into the balanced k-d layout: each subtree
    /// window is partitioned around its floor median on the axis cycling
    /// with depth.
    pub(crate) values: Vec<T>,
    /// One bit per item; set for a median with an equal-keyed item on its
    /// left, which equality searches must then also descend into.
    pub(crate) dirty: DirtyBits,
}

impl<T: IndexableItem> KdTree<T> {
    /// Build a tree over `dim` dimensions from a non-empty collection.
    ///
    /// ## Errors
    ///
    /// - If `dim` is zero.
    /// - If `values` is empty.
    pub fn new(dim: usize, mut values: Vec<T>) -> Result<Self> {
        if dim == 0 {
            return Err(DimIndexError::InvalidArgument(
                "dimension count must be at least 1".to_string(),
            ));
        }
        if values.is_empty() {
            return Err(DimIndexError::EmptyConstruction);
        }

        let mut dirty = DirtyBits::zeroed(values.len());
        kd_sort(&mut values, &mut dirty, dim);

        Ok(Self { dim, values, dirty })
    }

    /// The number of dimensions this tree splits on.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The number of stored items.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: empty trees are never constructed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all stored items, in storage order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Consume the tree, returning ownership of its items.
    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    /// Returns `true` iff an item equal to `key` on every axis is stored.
    pub fn contains(&self, key: &T) -> bool {
        self.contains_in(key, 0, self.values.len() - 1, 0)
    }

    fn contains_in(&self, key: &T, left: usize, right: usize, axis: usize) -> bool {
        let m = (left + right) >> 1;
        let mid = &self.values[m];
        if items_equal(key, mid, self.dim) {
            return true;
        }

        let c = key.cmp_dim(mid, axis);
        let next_axis = (axis + 1) % self.dim;
        if c != Ordering::Less && m < right && self.contains_in(key, m + 1, right, next_axis) {
            return true;
        }

        // on split-axis equality the left half holds duplicates only when
        // the dirty bit is set
        let descend_left = c == Ordering::Less || (c == Ordering::Equal && self.dirty.get(m));
        descend_left && m > left && self.contains_in(key, left, m - 1, next_axis)
    }

    /// A lazy iterator over every stored duplicate of `key`.
    ///
    /// Each call starts a fresh traversal; the visit order is the
    /// deterministic search order of the tree.
    pub fn get<'a>(&'a self, key: &'a T) -> Matches<'a, T> {
        Matches::new(self, key)
    }

    /// Call `f` on every stored item equal to `key` on every axis.
    ///
    /// `f` returns `true` to cancel the traversal. Returns `true` iff the
    /// traversal was canceled.
    pub fn for_each_equal<F: FnMut(&T) -> bool>(&self, key: &T, mut f: F) -> bool {
        self.for_each_equal_in(key, &mut f, 0, self.values.len() - 1, 0)
    }

    fn for_each_equal_in<F: FnMut(&T) -> bool>(
        &self,
        key: &T,
        f: &mut F,
        left: usize,
        right: usize,
        axis: usize,
    ) -> bool {
        let m = (left + right) >> 1;
        let mid = &self.values[m];
        if items_equal(key, mid, self.dim) && f(mid) {
            return true;
        }

        let c = key.cmp_dim(mid, axis);
        let next_axis = (axis + 1) % self.dim;
        if c != Ordering::Less
            && m < right
            && self.for_each_equal_in(key, f, m + 1, right, next_axis)
        {
            return true;
        }

        let descend_left = c == Ordering::Less || (c == Ordering::Equal && self.dirty.get(m));
        descend_left && m > left && self.for_each_equal_in(key, f, left, m - 1, next_axis)
    }

    /// Call `f` on every stored item. Cancel semantics as in
    /// [`for_each_equal`][Self::for_each_equal].
    pub fn for_each<F: FnMut(&T) -> bool>(&self, mut f: F) -> bool {
        for value in &self.values {
            if f(value) {
                return true;
            }
        }
        false
    }

    /// Call `f` on every stored item between two optional bounds.
    ///
    /// A value is visited iff it is `>=` `lo` on every axis and `<=` `hi`
    /// (`<` when `hi_inclusive` is false) on every axis. Returns
    /// immediately when the bounds are inverted on any axis. Cancel
    /// semantics as in [`for_each_equal`][Self::for_each_equal].
    pub fn for_each_in_range<F: FnMut(&T) -> bool>(
        &self,
        lo: Option<&T>,
        hi: Option<&T>,
        hi_inclusive: bool,
        mut f: F,
    ) -> bool {
        if bounds_inverted(lo, hi, self.dim) {
            return false;
        }
        self.range_in(lo, hi, hi_inclusive, &mut f, 0, self.values.len() - 1, 0)
    }

    #[allow(clippy::too_many_arguments)]
    fn range_in<F: FnMut(&T) -> bool>(
        &self,
        lo: Option<&T>,
        hi: Option<&T>,
        hi_inclusive: bool,
        f: &mut F,
        left: usize,
        right: usize,
        axis: usize,
    ) -> bool {
        let m = (left + right) >> 1;
        let mid = &self.values[m];
        if in_range(mid, lo, hi, hi_inclusive, self.dim) && f(mid) {
            return true;
        }

        let c_hi = hi.map(|hi| hi.cmp_dim(mid, axis));
        let c_lo = lo.map(|lo| lo.cmp_dim(mid, axis));
        let next_axis = (axis + 1) % self.dim;

        // the right half may hold keys at or below the upper bound on this axis
        if c_hi != Some(Ordering::Less)
            && m < right
            && self.range_in(lo, hi, hi_inclusive, f, m + 1, right, next_axis)
        {
            return true;
        }

        // the left half may hold keys at or above the lower bound, or
        // duplicates of an upper bound that lands exactly on the median
        let descend_left = c_lo != Some(Ordering::Greater)
            || (self.dirty.get(m) && c_hi == Some(Ordering::Equal));
        descend_left && m > left && self.range_in(lo, hi, hi_inclusive, f, left, m - 1, next_axis)
    }
}

/// Full-dimension equality: `Equal` on every axis below `dim`.
#[inline]
pub(crate) fn items_equal<T: IndexableItem>(a: &T, b: &T, dim: usize) -> bool {
    (0..dim).all(|d| a.cmp_dim(b, d) == Ordering::Equal)
}

/// Whether both bounds are present and inverted on any axis, making the
/// range empty.
pub(crate) fn bounds_inverted<T: IndexableItem>(
    lo: Option<&T>,
    hi: Option<&T>,
    dim: usize,
) -> bool {
    match (lo, hi) {
        (Some(lo), Some(hi)) => (0..dim).any(|d| lo.cmp_dim(hi, d) == Ordering::Greater),
        _ => false,
    }
}

/// Dimension-wise range membership against two optional bounds.
pub(crate) fn in_range<T: IndexableItem>(
    value: &T,
    lo: Option<&T>,
    hi: Option<&T>,
    hi_inclusive: bool,
    dim: usize,
) -> bool {
    if let Some(lo) = lo {
        for d in 0..dim {
            if value.cmp_dim(lo, d) == Ordering::Less {
                return false;
            }
        }
    }
    if let Some(hi) = hi {
        for d in 0..dim {
            match value.cmp_dim(hi, d) {
                Ordering::Greater => return false,
                Ordering::Equal if !hi_inclusive => return false,
                _ => {}
            }
        }
    }
    true
}
