//! Accumulation precision for row statistics

use num_traits::Float;
use std::fmt::Debug;

/// Scalar type running means, squared-deviation sums and counts are kept in.
///
/// Counts are stored in the same type as the moments so a whole accumulator
/// state can be exchanged between lanes as one homogeneous triple.
pub trait Accumulate: Float + Debug + Default + Send + Sync + 'static {
    /// Convert a literal (e.g. an epsilon) to this precision
    fn from_literal(v: f64) -> Self;

    /// Convert an element count to this precision
    fn from_count(n: usize) -> Self;

    /// Reciprocal square root, `1 / sqrt(self)`
    ///
    /// A square root and a division, bit-identical to `1 / x.sqrt()`.
    #[inline]
    fn rsqrt(self) -> Self {
        self.sqrt().recip()
    }
}

impl Accumulate for f32 {
    #[inline]
    fn from_literal(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn from_count(n: usize) -> Self {
        n as f32
    }
}

impl Accumulate for f64 {
    #[inline]
    fn from_literal(v: f64) -> Self {
        v
    }

    #[inline]
    fn from_count(n: usize) -> Self {
        n as f64
    }
}
