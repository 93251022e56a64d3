//! Operation traits.
//!
//! This module contains trait definitions for the supported operations.
//! Implementations are in the backend-specific modules (cpu/).

mod normalization;

pub use normalization::{
    Affine, DEFAULT_EPS, LayerNormArgs, LayerNormOut, LayerNormOutput, NormalizationOps,
    RowStatsOut,
};
