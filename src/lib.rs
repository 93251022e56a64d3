//! # fusednorm
//!
//! **Fused layer normalization over row-major matrices, executed the way a GPU
//! block executes it.**
//!
//! For each of `n1` rows of length `n2`, fusednorm computes the row mean and
//! biased variance in a single numerically stable pass (Welford's online update
//! with Chan's parallel merge), then writes
//! `gamma * (x - mean) / sqrt(variance + eps) + beta` and optionally the
//! per-row `mean` and `inv_std`.
//!
//! ## Execution model
//!
//! - A **block** is `groups` lane groups of `lanes` workers. Workers fold a
//!   strided share of the row, lane groups merge by lane exchange (or through
//!   shared scratch when the device reports none), and group results meet in a
//!   halving tree through block scratch.
//! - A **grid** of `grid_rows` independent blocks covers any number of rows
//!   with a strided row loop; blocks run concurrently on rayon.
//!
//! ## Quick Start
//!
//! ```rust
//! use fusednorm::prelude::*;
//!
//! let client = CpuClient::new(CpuDevice::new());
//! let x = [1.0f32, 2.0, 3.0, 4.0];
//! let out = client.layer_norm(&LayerNormArgs::new(&x, 1, 4))?;
//! assert!((out.mean[0] - 2.5).abs() < 1e-6);
//! # Ok::<(), fusednorm::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU backend
//! - `rayon` (default): Blocks of a grid run on a thread pool
//! - `f16` (default): Half-precision storage via `half::f16`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithm;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod runtime;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{DType, Element};
    pub use crate::error::{Error, Result};
    pub use crate::ops::{
        Affine, LayerNormArgs, LayerNormOut, LayerNormOutput, NormalizationOps, RowStatsOut,
    };
    pub use crate::runtime::{BlockShape, Device, DeviceCaps, IntraGroupReduce, LaunchConfig};

    #[cfg(feature = "cpu")]
    pub use crate::runtime::cpu::{CpuClient, CpuDevice, ParallelismConfig};
}
