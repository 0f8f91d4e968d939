//! An immutable, balanced k-d tree over items with per-dimension ordering.
//!
//! ## Creation
//!
//! Use [`KdTreeBuilder`] to construct a [`KdTree`], which allows you to make
//! queries, or build one directly from a collection with [`KdTree::new`].
//!
//! ## Search
//!
//! Use [`KdTree::contains`] and [`KdTree::get`] for exact-match queries,
//! which see every stored duplicate of the key. Use
//! [`KdTree::for_each_in_range`] to visit all items between two optional
//! dimension-wise bounds.
//!
//! ## Items
//!
//! Any type implementing [`IndexableItem`][crate::IndexableItem] can be
//! stored. Items equal on every axis are kept as duplicates and all of them
//! are found again by equality and range searches.
//!
//! ## Example
//!
//! ```
//! use dim_index::kdtree::KdTreeBuilder;
//!
//! // Create a KdTree
//! let mut builder = KdTreeBuilder::new(2);
//! builder.add([54, 1]);
//! builder.add([97, 21]);
//! builder.add([54, 1]);
//! let tree = builder.finish().unwrap();
//!
//! // Exact-match queries see every duplicate
//! assert_eq!(tree.get(&[54, 1]).count(), 2);
//! assert!(tree.contains(&[97, 21]));
//! assert!(!tree.contains(&[54, 2]));
//!
//! // Range queries take optional dimension-wise bounds
//! let mut in_range = 0;
//! tree.for_each_in_range(Some(&[50, 0]), Some(&[100, 30]), true, |_| {
//!     in_range += 1;
//!     false
//! });
//! assert_eq!(in_range, 3);
//! ```

mod builder;
mod index;
mod metric;
mod traversal;

pub use builder::KdTreeBuilder;
pub use index::KdTree;
pub use metric::MetricKdTree;
pub use traversal::Matches;

pub(crate) use index::{bounds_inverted, in_range, items_equal};
pub(crate) use metric::{nearest_in, squared_distance};

#[cfg(test)]
mod test;
