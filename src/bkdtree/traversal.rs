//! Lazy iteration over a growing tree, guarded against concurrent inserts.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::bkdtree::BkdTree;
use crate::kdtree;
use crate::kdtree::{items_equal, KdTree};
use crate::r#type::IndexableItem;

/// RAII registration of a live enumeration.
///
/// [`BkdTree::insert`] fails while the counter is nonzero, so a lazy
/// iterator never observes a slot reorganization. Dropping the iterator
/// releases the tree; a leaked iterator pins it read-only permanently, like
/// a leaked lock guard.
#[derive(Debug)]
pub(crate) struct EnumerationGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> EnumerationGuard<'a> {
    pub(crate) fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self { counter }
    }
}

impl Drop for EnumerationGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A lazy iterator over the stored duplicates of one key in a [`BkdTree`]:
/// the base buffer first, then every occupied slot in ascending order.
///
/// Returned by [`BkdTree::get`].
#[derive(Debug)]
pub struct Matches<'a, T: IndexableItem> {
    key: &'a T,
    dim: usize,
    base: std::slice::Iter<'a, T>,
    slots: std::slice::Iter<'a, Option<KdTree<T>>>,
    current: Option<kdtree::Matches<'a, T>>,
    _guard: EnumerationGuard<'a>,
}

impl<'a, T: IndexableItem> Matches<'a, T> {
    pub(crate) fn new(tree: &'a BkdTree<T>, key: &'a T) -> Self {
        Self {
            key,
            dim: tree.dim,
            base: tree.base.iter(),
            slots: tree.slots.iter(),
            current: None,
            _guard: EnumerationGuard::new(&tree.enumerations),
        }
    }
}

impl<'a, T: IndexableItem> Iterator for Matches<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        for value in self.base.by_ref() {
            if items_equal(self.key, value, self.dim) {
                return Some(value);
            }
        }
        loop {
            if let Some(matches) = &mut self.current {
                if let Some(value) = matches.next() {
                    return Some(value);
                }
                self.current = None;
            }
            match self.slots.next() {
                Some(Some(tree)) => self.current = Some(tree.get(self.key)),
                Some(None) => continue,
                None => return None,
            }
        }
    }
}

/// A lazy iterator over every stored item in a [`BkdTree`]: the base buffer
/// first, then every occupied slot in ascending order.
///
/// Returned by [`BkdTree::iter`].
#[derive(Debug)]
pub struct Iter<'a, T: IndexableItem> {
    base: std::slice::Iter<'a, T>,
    slots: std::slice::Iter<'a, Option<KdTree<T>>>,
    current: Option<std::slice::Iter<'a, T>>,
    _guard: EnumerationGuard<'a>,
}

impl<'a, T: IndexableItem> Iter<'a, T> {
    pub(crate) fn new(tree: &'a BkdTree<T>) -> Self {
        Self {
            base: tree.base.iter(),
            slots: tree.slots.iter(),
            current: None,
            _guard: EnumerationGuard::new(&tree.enumerations),
        }
    }
}

impl<'a, T: IndexableItem> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(value) = self.base.next() {
            return Some(value);
        }
        loop {
            if let Some(current) = &mut self.current {
                if let Some(value) = current.next() {
                    return Some(value);
                }
                self.current = None;
            }
            match self.slots.next() {
                Some(Some(tree)) => self.current = Some(tree.iter()),
                Some(None) => continue,
                None => return None,
            }
        }
    }
}
