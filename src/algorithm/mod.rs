//! Algorithm contracts shared by every reduction path
//!
//! The statistics of a row are produced by folding values into
//! [`WelfordState`] accumulators and merging accumulators with
//! [`Combine::combine`]. Backends only decide *where* partial states live
//! (registers, lane groups, block scratch) and in which tree shape they are
//! merged; the arithmetic itself is defined once here.
//!
//! ```text
//! raw row ──► per-worker WelfordState (online_update)
//!                  │
//!                  ▼  Combine::combine, log2(lanes) rounds
//!             lane-group result
//!                  │
//!                  ▼  Combine::combine, log2(groups) rounds via scratch
//!             block result ──► RowMoments { mean, variance }
//! ```

pub mod welford;

pub use welford::{Combine, RowMoments, WelfordState};
