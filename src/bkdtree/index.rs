use std::sync::atomic::{AtomicUsize, Ordering};

use crate::bkdtree::constants::{DEFAULT_BLOCK_SIZE, MAX_SLOTS};
use crate::bkdtree::traversal::{Iter, Matches};
use crate::error::{DimIndexError, Result};
use crate::kdtree::{bounds_inverted, in_range, items_equal, KdTree};
use crate::r#type::IndexableItem;

/// A growing B-k-d tree.
///
/// Inserts land in a base buffer of `block_size` items; a full buffer is
/// merged, together with every occupied slot below the first empty one,
/// into a single frozen [`KdTree`], so an occupied slot `k` always holds
/// exactly `block_size << k` items. Queries fan out over the base buffer
/// and every occupied slot, base first, slots in ascending order.
#[derive(Debug)]
pub struct BkdTree<T: IndexableItem> {
    pub(crate) dim: usize,
    pub(crate) block_size: usize,
    /// The most recent uncommitted inserts, at most `block_size` of them.
    pub(crate) base: Vec<T>,
    /// The logarithmic forest.
    pub(crate) slots: Vec<Option<KdTree<T>>>,
    pub(crate) len: usize,
    /// Nonzero while a lazy iterator is alive; inserts fail in that state.
    pub(crate) enumerations: AtomicUsize,
}

impl<T: IndexableItem> BkdTree<T> {
    /// Create an empty tree over `dim` dimensions with the default block
    /// size of [`DEFAULT_BLOCK_SIZE`].
    ///
    /// ## Errors
    ///
    /// - If `dim` is zero.
    pub fn new(dim: usize) -> Result<Self> {
        Self::with_block_size(dim, DEFAULT_BLOCK_SIZE)
    }

    /// Create an empty tree over `dim` dimensions with the provided block
    /// size.
    ///
    /// ## Errors
    ///
    /// - If `dim` is zero.
    /// - If `block_size` is less than 2.
    pub fn with_block_size(dim: usize, block_size: usize) -> Result<Self> {
        if dim == 0 {
            return Err(DimIndexError::InvalidArgument(
                "dimension count must be at least 1".to_string(),
            ));
        }
        if block_size < 2 {
            return Err(DimIndexError::InvalidArgument(
                "block size must be at least 2".to_string(),
            ));
        }

        Ok(Self {
            dim,
            block_size,
            base: Vec::with_capacity(block_size),
            slots: Vec::new(),
            len: 0,
            enumerations: AtomicUsize::new(0),
        })
    }

    /// The number of dimensions this tree splits on.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The capacity of the base buffer.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The total number of inserted items.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no items have been inserted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert one item.
    ///
    /// ## Errors
    ///
    /// - If a lazy iterator obtained from [`get`][Self::get] or
    ///   [`iter`][Self::iter] is still alive.
    /// - If the slot cascade is full.
    pub fn insert(&mut self, value: T) -> Result<()> {
        if self.enumerations.load(Ordering::Acquire) != 0 {
            return Err(DimIndexError::ConcurrentModification);
        }
        if self.base.len() == self.block_size {
            self.merge_into_slot()?;
        }
        self.base.push(value);
        self.len += 1;
        Ok(())
    }

    /// Merge the full base buffer and all occupied slots below the first
    /// empty slot into one frozen tree at that slot, emptying the inputs.
    fn merge_into_slot(&mut self) -> Result<()> {
        let k0 = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .unwrap_or(self.slots.len());
        if k0 >= MAX_SLOTS {
            return Err(DimIndexError::CapacityExceeded);
        }

        // base + B + 2B + ... + 2^(k0-1) B = B << k0 items in total
        let mut merged = Vec::with_capacity(self.block_size << k0);
        merged.append(&mut self.base);
        for slot in &mut self.slots[..k0] {
            // every slot below k0 is occupied by choice of k0
            merged.extend(slot.take().unwrap().into_values());
        }

        let tree = KdTree::new(self.dim, merged)?;
        if k0 == self.slots.len() {
            self.slots.push(Some(tree));
        } else {
            self.slots[k0] = Some(tree);
        }
        Ok(())
    }

    /// Returns `true` iff an item equal to `key` on every axis is stored.
    pub fn contains(&self, key: &T) -> bool {
        self.base.iter().any(|value| items_equal(key, value, self.dim))
            || self.slots.iter().flatten().any(|tree| tree.contains(key))
    }

    /// A lazy iterator over every stored duplicate of `key`, base buffer
    /// first, then every occupied slot in ascending order.
    ///
    /// Each call starts a fresh traversal. The tree cannot be inserted into
    /// while the iterator is alive.
    pub fn get<'a>(&'a self, key: &'a T) -> Matches<'a, T> {
        Matches::new(self, key)
    }

    /// A lazy iterator over every stored item, base buffer first, then
    /// every occupied slot in ascending order.
    ///
    /// The tree cannot be inserted into while the iterator is alive.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Call `f` on every stored item.
    ///
    /// `f` returns `true` to cancel; cancellation unwinds the whole
    /// fan-out. Returns `true` iff canceled.
    pub fn for_each<F: FnMut(&T) -> bool>(&self, mut f: F) -> bool {
        for value in &self.base {
            if f(value) {
                return true;
            }
        }
        for tree in self.slots.iter().flatten() {
            if tree.for_each(&mut f) {
                return true;
            }
        }
        false
    }

    /// Call `f` on every stored item equal to `key` on every axis. Cancel
    /// semantics as in [`for_each`][Self::for_each].
    pub fn for_each_equal<F: FnMut(&T) -> bool>(&self, key: &T, mut f: F) -> bool {
        for value in &self.base {
            if items_equal(key, value, self.dim) && f(value) {
                return true;
            }
        }
        for tree in self.slots.iter().flatten() {
            if tree.for_each_equal(key, &mut f) {
                return true;
            }
        }
        false
    }

    /// Call `f` on every stored item between two optional dimension-wise
    /// bounds, as in
    /// [`KdTree::for_each_in_range`][crate::kdtree::KdTree::for_each_in_range].
    /// Cancel semantics as in [`for_each`][Self::for_each].
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
        for value in &self.base {
            if in_range(value, lo, hi, hi_inclusive, self.dim) && f(value) {
                return true;
            }
        }
        for tree in self.slots.iter().flatten() {
            if tree.for_each_in_range(lo, hi, hi_inclusive, &mut f) {
                return true;
            }
        }
        false
    }
}
