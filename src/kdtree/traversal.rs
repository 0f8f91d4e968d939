//! Utilities to traverse the KdTree structure.

use std::cmp::Ordering;

use tinyvec::TinyVec;

use crate::kdtree::index::items_equal;
use crate::kdtree::KdTree;
use crate::r#type::IndexableItem;

/// A lazy iterator over the stored duplicates of one key.
///
/// Returned by [`KdTree::get`]. Every instance is a fresh traversal; items
/// are yielded in the deterministic search order of the tree (median first,
/// then the right half, then the left half).
#[derive(Debug)]
pub struct Matches<'a, T: IndexableItem> {
    tree: &'a KdTree<T>,
    key: &'a T,
    /// Pending subtree windows, three entries per frame: left, right, axis.
    /// Use TinyVec to avoid heap allocations.
    stack: TinyVec<[usize; 33]>,
}

impl<'a, T: IndexableItem> Matches<'a, T> {
    pub(crate) fn new(tree: &'a KdTree<T>, key: &'a T) -> Self {
        let mut stack = TinyVec::new();
        stack.push(0);
        stack.push(tree.values.len() - 1);
        stack.push(0);
        Self { tree, key, stack }
    }
}

impl<'a, T: IndexableItem> Iterator for Matches<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.stack.is_empty() {
            let axis = self.stack.pop().unwrap_or(0);
            let right = self.stack.pop().unwrap_or(0);
            let left = self.stack.pop().unwrap_or(0);

            let m = (left + right) >> 1;
            let mid = &self.tree.values[m];
            let c = self.key.cmp_dim(mid, axis);
            let next_axis = (axis + 1) % self.tree.dim;

            // push the left half first so the right half is visited before it
            let descend_left =
                c == Ordering::Less || (c == Ordering::Equal && self.tree.dirty.get(m));
            if descend_left && m > left {
                self.stack.push(left);
                self.stack.push(m - 1);
                self.stack.push(next_axis);
            }
            if c != Ordering::Less && m < right {
                self.stack.push(m + 1);
                self.stack.push(right);
                self.stack.push(next_axis);
            }

            if items_equal(self.key, mid, self.tree.dim) {
                return Some(mid);
            }
        }
        None
    }
}
