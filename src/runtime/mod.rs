//! Runtime backends for block-structured kernels
//!
//! # Architecture
//!
//! ```text
//! Device (identifies a compute unit, answers capability queries)
//! ├── LaunchConfig (block shape, grid rows, intra-group strategy)
//! └── Client (owns the thread pool blocks are scheduled on)
//!     └── kernels (per-block lock-step execution)
//! ```
//!
//! The CPU backend executes each block in lock-step phases: every worker of
//! a block runs a phase to completion before the next phase starts, which is
//! exactly the ordering a barrier gives on a GPU. Blocks are independent and
//! are scheduled concurrently.

#[cfg(feature = "cpu")]
pub mod cpu;
mod launch;
pub mod traits;

pub use launch::{BlockShape, DEFAULT_GROUPS_PER_BLOCK, IntraGroupReduce, LaunchConfig};
pub use traits::{Device, DeviceCaps};
