//! Element trait for mapping Rust storage types to DType

use super::{Accumulate, DType};
use bytemuck::{Pod, Zeroable};
use std::fmt::Debug;

/// Trait for types a row can be stored in
///
/// This trait connects Rust's type system to fusednorm's runtime dtype
/// tags and pairs every storage type with its accumulation precision.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - rows are shared read-only across workers
/// - `Pod + Zeroable` - safe reinterpretation for widened loads (bytemuck)
/// - `PartialOrd + Debug` - test assertions and diagnostics
pub trait Element: Copy + Send + Sync + Pod + Zeroable + PartialOrd + Debug + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Precision statistics over this type are accumulated in
    type Acc: Accumulate;

    /// Widen to the accumulation precision
    fn to_acc(self) -> Self::Acc;

    /// Narrow from the accumulation precision (round to nearest)
    fn from_acc(v: Self::Acc) -> Self;

    /// Convert to f64 for reference computations
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type
    fn from_f64(v: f64) -> Self;

    /// `gamma * self + beta`, evaluated the way the storage type does arithmetic
    fn scale_shift(self, gamma: Self, beta: Self) -> Self;
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;
    type Acc = f32;

    #[inline]
    fn to_acc(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_acc(v: f32) -> Self {
        v as f64
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn scale_shift(self, gamma: Self, beta: Self) -> Self {
        gamma * self + beta
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;
    type Acc = f32;

    #[inline]
    fn to_acc(self) -> f32 {
        self
    }

    #[inline]
    fn from_acc(v: f32) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn scale_shift(self, gamma: Self, beta: Self) -> Self {
        gamma * self + beta
    }
}

// Half-precision floating point (requires "f16" feature)
#[cfg(feature = "f16")]
impl Element for half::f16 {
    const DTYPE: DType = DType::F16;
    type Acc = f32;

    #[inline]
    fn to_acc(self) -> f32 {
        self.to_f32()
    }

    #[inline]
    fn from_acc(v: f32) -> Self {
        half::f16::from_f32(v)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        half::f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::f16::from_f64(v)
    }

    // Half operands are promoted to f32 and the result rounded once.
    #[inline]
    fn scale_shift(self, gamma: Self, beta: Self) -> Self {
        half::f16::from_f32(gamma.to_f32() * self.to_f32() + beta.to_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_dtype() {
        assert_eq!(f32::DTYPE, DType::F32);
        assert_eq!(f64::DTYPE, DType::F64);
    }

    #[test]
    fn test_f64_accumulates_in_f32() {
        let x = 1.0_f64 + 1e-12;
        assert_eq!(x.to_acc(), 1.0_f32);
        assert_eq!(<f64 as Element>::from_acc(0.5), 0.5);
    }

    #[test]
    fn test_scale_shift() {
        assert_eq!(2.0_f32.scale_shift(3.0, 1.0), 7.0);
        assert_eq!((-1.0_f64).scale_shift(0.5, 0.25), -0.25);
    }

    #[cfg(feature = "f16")]
    #[test]
    fn test_f16_scale_shift_rounds_once() {
        use half::f16;
        let n = f16::from_f32(0.3);
        let g = f16::from_f32(3.0);
        let b = f16::from_f32(0.1);
        let expected = f16::from_f32(g.to_f32() * n.to_f32() + b.to_f32());
        assert_eq!(n.scale_shift(g, b), expected);
        assert_eq!(f16::DTYPE, DType::F16);
        assert_eq!(f16::from_f32(1.5).to_acc(), 1.5_f32);
    }
}
