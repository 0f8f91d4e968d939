//! A growing B-k-d tree: an insert-only index amortizing bulk-built
//! [`KdTree`][crate::kdtree::KdTree]s via a logarithmic forest.
//!
//! ## Creation
//!
//! Use [`BkdTree::new`] (default block size) or
//! [`BkdTree::with_block_size`], then [`BkdTree::insert`] items one at a
//! time. Recent inserts sit in a small base buffer; whenever the buffer
//! fills, it is merged together with a prefix of the forest into one new
//! frozen k-d tree, so slot `k` always holds exactly `block_size << k`
//! items. Deletion is not supported.
//!
//! ## Search
//!
//! The same queries as the static tree, fanned out over the base buffer and
//! every occupied slot: [`BkdTree::contains`], [`BkdTree::get`],
//! [`BkdTree::for_each_in_range`]. Lazy iterators pin the tree read-only
//! while they are alive; an insert in that state fails with
//! [`ConcurrentModification`][crate::DimIndexError::ConcurrentModification].
//!
//! ## Example
//!
//! ```
//! use dim_index::bkdtree::BkdTree;
//!
//! let mut tree = BkdTree::with_block_size(2, 2).unwrap();
//! tree.insert([0, 0]).unwrap();
//! tree.insert([1, 1]).unwrap();
//! tree.insert([0, 0]).unwrap();
//!
//! assert_eq!(tree.len(), 3);
//! assert_eq!(tree.get(&[0, 0]).count(), 2);
//! assert!(tree.contains(&[1, 1]));
//! ```

pub(crate) mod constants;
mod index;
mod metric;
mod traversal;

pub use constants::DEFAULT_BLOCK_SIZE;
pub use index::BkdTree;
pub use metric::MetricBkdTree;
pub use traversal::{Iter, Matches};
