use std::cmp::Ordering;

use crate::bits::DirtyBits;
use crate::error::Result;
use crate::kdtree::KdTree;
use crate::r#type::IndexableItem;

/// A builder to create a [`KdTree`].
#[derive(Debug)]
pub struct KdTreeBuilder<T: IndexableItem> {
    dim: usize,
    values: Vec<T>,
}

impl<T: IndexableItem> KdTreeBuilder<T> {
    /// Create a new builder for items with the provided number of dimensions.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            values: Vec::new(),
        }
    }

    /// Create a new builder with room for `capacity` items.
    pub fn with_capacity(dim: usize, capacity: usize) -> Self {
        Self {
            dim,
            values: Vec::with_capacity(capacity),
        }
    }

    /// Add an item to the KdTree.
    ///
    /// This returns the insertion index of the item. Note that
    /// [`finish`][Self::finish] reorders items into the k-d layout.
    #[inline]
    pub fn add(&mut self, item: T) -> usize {
        let index = self.values.len();
        self.values.push(item);
        index
    }

    /// Consume this builder, performing the k-d sort and generating a
    /// [`KdTree`] ready for queries.
    ///
    /// ## Errors
    ///
    /// - If the dimension count is zero.
    /// - If no items were added.
    pub fn finish(self) -> Result<KdTree<T>> {
        KdTree::new(self.dim, self.values)
    }
}

/// A stateless comparator fixing one axis of [`IndexableItem::cmp_dim`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct DimComparator {
    axis: usize,
}

impl DimComparator {
    #[inline]
    pub(crate) fn new(axis: usize) -> Self {
        Self { axis }
    }

    #[inline]
    pub(crate) fn compare<T: IndexableItem>(&self, a: &T, b: &T) -> Ordering {
        a.cmp_dim(b, self.axis)
    }
}

/// Recursively kd-sort `values` in place so that every subtree window
/// `[left..right]` is partitioned around its floor median on the axis for
/// its depth, recording a dirty bit for every median that has an equal-keyed
/// item to its left.
pub(crate) fn kd_sort<T: IndexableItem>(values: &mut [T], dirty: &mut DirtyBits, dim: usize) {
    debug_assert!(!values.is_empty());
    sort(values, dirty, dim, 0, values.len() - 1, 0);
}

fn sort<T: IndexableItem>(
    values: &mut [T],
    dirty: &mut DirtyBits,
    dim: usize,
    left: usize,
    right: usize,
    axis: usize,
) {
    let comparator = DimComparator::new(axis);
    values[left..=right].sort_unstable_by(|a, b| comparator.compare(a, b));

    // middle index
    let m = (left + right) >> 1;

    // the left half may keep items equal to the median on this axis; the
    // dirty bit tells equality searches to descend there too
    let first_equal = find_first_equal(values, m, left, right, axis);
    dirty.set(m, first_equal.is_some_and(|first| first < m));

    // recursively kd-sort first half and second half on the next axis
    let next_axis = (axis + 1) % dim;
    if m > left {
        sort(values, dirty, dim, left, m - 1, next_axis);
    }
    if m < right {
        sort(values, dirty, dim, m + 1, right, next_axis);
    }
}

/// Binary search for the least index in `[left, right]` whose value is equal
/// to `values[key]` on `axis`, or `None` when the sorted window holds no
/// equal value. On a hit the search keeps refining into the left half to
/// find the earliest equal index.
fn find_first_equal<T: IndexableItem>(
    values: &[T],
    key: usize,
    mut left: usize,
    mut right: usize,
    axis: usize,
) -> Option<usize> {
    while left <= right {
        let m = (left + right) >> 1;
        match values[key].cmp_dim(&values[m], axis) {
            Ordering::Less => {
                if m == right {
                    return None;
                }
                right = m;
            }
            Ordering::Greater => left = m + 1,
            Ordering::Equal => {
                return if m > left {
                    Some(find_first_equal(values, key, left, m - 1, axis).unwrap_or(m))
                } else {
                    Some(m)
                };
            }
        }
    }
    None
}
