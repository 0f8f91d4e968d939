mod bits;
pub mod bkdtree;
pub mod error;
pub mod kdtree;
pub mod r#type;

pub use error::{DimIndexError, Result};
pub use r#type::{IndexableItem, MetricItem};

#[cfg(test)]
pub(crate) mod test;
