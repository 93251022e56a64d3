//! Data type system for fusednorm
//!
//! This module provides the `DType` enum naming the supported storage types,
//! the `Element` trait mapping Rust types to it, and the `Accumulate` trait
//! describing the precision statistics are accumulated in.

mod accumulate;
mod element;

pub use accumulate::Accumulate;
pub use element::Element;

use std::fmt;

// ============================================================================
// DType Enum
// ============================================================================

/// Storage types a row can be laid out in
///
/// # Discriminant Values (Serialization Stability)
///
/// Discriminants (F64=0, F32=1, F16=2) are part of the public contract and
/// are never renumbered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point (most common)
    F32 = 1,
    /// 16-bit floating point (IEEE 754)
    F16 = 2,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F64 => 8,
            Self::F32 => 4,
            Self::F16 => 2,
        }
    }

    /// Dtype statistics are accumulated in for this storage type
    ///
    /// Always F32, including for F64 storage.
    #[inline]
    pub const fn accumulation_dtype(self) -> Self {
        Self::F32
    }

    /// Returns true if loads of this type are widened to element pairs
    #[inline]
    pub const fn uses_paired_loads(self) -> bool {
        matches!(self, Self::F16)
    }

    /// Short name for display (e.g., "f32")
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::F16 => "f16",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_size() {
        assert_eq!(DType::F64.size_in_bytes(), 8);
        assert_eq!(DType::F32.size_in_bytes(), 4);
        assert_eq!(DType::F16.size_in_bytes(), 2);
    }

    #[test]
    fn test_accumulation_is_f32() {
        for dtype in [DType::F64, DType::F32, DType::F16] {
            assert_eq!(dtype.accumulation_dtype(), DType::F32);
        }
        assert!(DType::F16.uses_paired_loads());
        assert!(!DType::F32.uses_paired_loads());
    }

    #[test]
    fn test_dtype_display() {
        assert_eq!(DType::F16.to_string(), "f16");
        assert_eq!(format!("{}", DType::F64), "f64");
        assert_eq!(DType::F32 as u8, 1);
    }
}
