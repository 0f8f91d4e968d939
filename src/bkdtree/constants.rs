/// Default capacity of the base buffer in [`BkdTree::new`][super::BkdTree::new].
pub const DEFAULT_BLOCK_SIZE: usize = 128;

/// Maximum number of slots in the cascade. Slot `k` holds `block_size << k`
/// items, so this bounds a tree at `block_size * (2^32 - 1)` items.
pub(crate) const MAX_SLOTS: usize = 32;
