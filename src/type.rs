use std::cmp::Ordering;

/// An item that can be stored in the indexes of this crate.
///
/// Implementors provide one total order per axis. The order must be
/// deterministic and antisymmetric: `a.cmp_dim(b, d)` is always the reverse
/// of `b.cmp_dim(a, d)`. Two items are considered equal by the indexes iff
/// `cmp_dim` returns [`Ordering::Equal`] on every axis; duplicates under
/// that relation are permitted and preserved.
///
/// The axis passed by the index is always `< dim` of the index, so the
/// implementation is free to panic on out-of-range axes.
pub trait IndexableItem {
    /// Compare `self` with `other` along the given axis.
    fn cmp_dim(&self, other: &Self, dim: usize) -> Ordering;
}

/// Extends [`IndexableItem`] with per-axis scalar coordinates, enabling
/// Euclidean nearest-neighbor queries.
pub trait MetricItem: IndexableItem {
    /// The scalar coordinate of this item along the given axis.
    fn coord(&self, dim: usize) -> f64;
}

impl<const N: usize> IndexableItem for [i32; N] {
    #[inline]
    fn cmp_dim(&self, other: &Self, dim: usize) -> Ordering {
        self[dim].cmp(&other[dim])
    }
}

impl<const N: usize> MetricItem for [i32; N] {
    #[inline]
    fn coord(&self, dim: usize) -> f64 {
        self[dim] as f64
    }
}

impl<const N: usize> IndexableItem for [i64; N] {
    #[inline]
    fn cmp_dim(&self, other: &Self, dim: usize) -> Ordering {
        self[dim].cmp(&other[dim])
    }
}

impl<const N: usize> MetricItem for [i64; N] {
    #[inline]
    fn coord(&self, dim: usize) -> f64 {
        self[dim] as f64
    }
}

impl<const N: usize> IndexableItem for [f32; N] {
    #[inline]
    fn cmp_dim(&self, other: &Self, dim: usize) -> Ordering {
        self[dim].total_cmp(&other[dim])
    }
}

impl<const N: usize> MetricItem for [f32; N] {
    #[inline]
    fn coord(&self, dim: usize) -> f64 {
        self[dim] as f64
    }
}

impl<const N: usize> IndexableItem for [f64; N] {
    #[inline]
    fn cmp_dim(&self, other: &Self, dim: usize) -> Ordering {
        self[dim].total_cmp(&other[dim])
    }
}

impl<const N: usize> MetricItem for [f64; N] {
    #[inline]
    fn coord(&self, dim: usize) -> f64 {
        self[dim]
    }
}
