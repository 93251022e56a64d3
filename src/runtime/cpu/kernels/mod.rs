//! CPU kernel implementations
//!
//! Kernels are generic over `T: RowLoad` and execute one block of a launch
//! at a time in lock-step phases.

pub mod load;
pub mod merge;
pub mod norm;

pub use load::{RowLoad, fold_chunked};
#[cfg(feature = "f16")]
pub use load::fold_half_pairs;
pub use merge::{
    block_broadcast, group_tree_reduce, lane_broadcast, lane_butterfly_reduce, lane_rotate_reduce,
    lane_scratch_reduce,
};
pub use norm::{apply_row, layer_norm_kernel, row_statistics};
