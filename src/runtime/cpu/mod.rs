//! CPU runtime implementation
//!
//! The CPU runtime executes the block/lane-group execution model on the
//! host. Each block owns its worker registers, a lane-exchange staging area
//! and a shared scratch buffer; blocks are scheduled on rayon when the
//! `rayon` feature is enabled and run one after another otherwise.
//!
//! # Lock-step phases
//!
//! Within a block every phase (fold, merge round, scratch write, scratch
//! read, normalize) is run for all workers before the next one starts.
//! Phases that hand data through the scratch are separated by
//! [`SharedScratch::barrier`], and the scratch rejects any access pattern
//! that would race without one.

pub mod block;
mod client;
mod device;
pub mod kernels;

pub use block::{BlockContext, LaneGroup, SharedScratch};
pub use client::{CpuClient, ParallelismConfig};
pub use device::CpuDevice;
