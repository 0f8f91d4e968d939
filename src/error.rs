use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
pub enum DimIndexError {
    /// A constructor argument was out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The slot cascade of a growing tree reached its maximum depth and
    /// cannot absorb another merge.
    #[error("Capacity exceeded: the slot cascade is full")]
    CapacityExceeded,

    /// An insert was attempted while a lazy enumeration was in progress.
    #[error("Modification during enumeration")]
    ConcurrentModification,

    /// A static tree cannot be built from zero items.
    #[error("Cannot build an index from an empty set of items")]
    EmptyConstruction,
}

pub type Result<T> = std::result::Result<T, DimIndexError>;
