//! Runtime traits for compute backend abstraction

pub mod device;

pub use device::{Device, DeviceCaps};
