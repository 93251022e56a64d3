//! Row normalization operations
//!
//! Operations are defined as traits implemented by a backend client. The
//! client owns the device the launch is validated against and the thread
//! pool the grid runs on.
//!
//! ```text
//! CpuClient
//!   └── implements NormalizationOps<T>
//!         ├── layer_norm       (allocating, launch derived from device caps)
//!         └── layer_norm_into  (caller buffers, explicit LaunchConfig)
//! ```
//!
//! Every entry point validates shapes and the launch before the kernel runs;
//! the kernel itself has no failure modes.

#[cfg(feature = "cpu")]
pub(crate) mod cpu;
pub mod traits;

pub use traits::*;
