//! Fused layer normalization kernel
//!
//! One launch computes per-row statistics and writes the normalized row in a
//! single pass over the grid:
//!
//! ```text
//! for each block b (in parallel):
//!     for i1 in (b..n1).step_by(grid_rows):
//!         fold ─► intra-group merge ─► inter-group merge ─► broadcast
//!         out[i1, j] = gamma[j] * (x[i1, j] - mean) * inv_std + beta[j]
//!         worker 0 records mean[i1], inv_std[i1]
//!         barrier
//! ```

use super::load::RowLoad;
use super::merge::{
    block_broadcast, group_tree_reduce, lane_broadcast, lane_butterfly_reduce, lane_rotate_reduce,
    lane_scratch_reduce,
};
use crate::algorithm::{RowMoments, WelfordState};
use crate::ops::{Affine, RowStatsOut};
use crate::runtime::cpu::block::BlockContext;
use crate::runtime::cpu::client::CpuClient;
use crate::runtime::{IntraGroupReduce, LaunchConfig};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Compute the statistics of row `i1` with the block described by `ctx`
///
/// Every worker's copy of the result is left in [`BlockContext::moments`];
/// worker 0's copy is returned. A row index past `n1` yields zero statistics
/// and reads nothing.
pub fn row_statistics<T: RowLoad>(
    ctx: &mut BlockContext<T::Acc>,
    input: &[T],
    n1: usize,
    n2: usize,
    i1: usize,
) -> RowMoments<T::Acc> {
    if i1 >= n1 {
        ctx.moments.fill(RowMoments::zero());
        return RowMoments::zero();
    }

    let shape = ctx.shape();
    let intra = ctx.launch().intra();
    let lanes = shape.lanes();
    let numx = shape.workers();
    let row = &input[i1 * n2..(i1 + 1) * n2];

    for (thrx, state) in ctx.regs.iter_mut().enumerate() {
        *state = WelfordState::empty();
        T::fold_worker(row, thrx, numx, state);
    }

    match intra {
        IntraGroupReduce::Rotate => {
            for group in ctx.regs.chunks_mut(lanes) {
                lane_rotate_reduce(group, &mut ctx.shadow);
            }
        }
        IntraGroupReduce::Butterfly => {
            for group in ctx.regs.chunks_mut(lanes) {
                lane_butterfly_reduce(group, &mut ctx.shadow);
            }
        }
        IntraGroupReduce::Scratch => lane_scratch_reduce(&mut ctx.regs, &mut ctx.scratch, shape),
    }

    if shape.groups() > 1 {
        group_tree_reduce(&mut ctx.regs, &mut ctx.scratch, shape);
        block_broadcast(&mut ctx.regs, &mut ctx.scratch);
    } else if intra.uses_lane_exchange() {
        lane_broadcast(&mut ctx.regs, &mut ctx.shadow);
    } else {
        block_broadcast(&mut ctx.regs, &mut ctx.scratch);
    }

    for (moments, state) in ctx.moments.iter_mut().zip(&ctx.regs) {
        *moments = state.finalize(n2);
    }
    ctx.moments[0]
}

/// Normalize one row with the statistics each worker received
///
/// Worker `thrx` writes columns `thrx, thrx + numx, ...`. Returns worker 0's
/// inverse standard deviation.
pub fn apply_row<T: RowLoad>(
    ctx: &BlockContext<T::Acc>,
    row: &[T],
    affine: Option<Affine<'_, T>>,
    eps: T::Acc,
    out_row: &mut [T],
) -> T::Acc {
    let n2 = row.len();
    let numx = ctx.shape().workers();

    for (thrx, moments) in ctx.moments.iter().enumerate() {
        let inv_std = moments.inv_std(eps);
        match affine {
            Some(Affine { gamma, beta }) => {
                for j in (thrx..n2).step_by(numx) {
                    let normalized = T::from_acc(inv_std * (row[j].to_acc() - moments.mean));
                    out_row[j] = normalized.scale_shift(gamma[j], beta[j]);
                }
            }
            None => {
                for j in (thrx..n2).step_by(numx) {
                    out_row[j] = T::from_acc(inv_std * (row[j].to_acc() - moments.mean));
                }
            }
        }
    }
    ctx.moments[0].inv_std(eps)
}

/// Fused layer normalization over an `n1 x n2` row-major matrix
///
/// Block `b` of the grid processes rows `b, b + grid_rows, ...`; blocks run
/// concurrently on the client's thread pool. `affine` slices have length
/// `n2` and `stats` buffers length `n1`.
///
/// # Panics
/// If any slice length disagrees with `n1` and `n2`.
#[allow(clippy::too_many_arguments)]
pub fn layer_norm_kernel<T: RowLoad>(
    client: &CpuClient,
    launch: &LaunchConfig,
    input: &[T],
    n1: usize,
    n2: usize,
    affine: Option<Affine<'_, T>>,
    eps: T::Acc,
    output: &mut [T],
    stats: Option<RowStatsOut<'_, T::Acc>>,
) {
    let len = n1 * n2;
    assert_eq!(input.len(), len, "input holds {} elements, shape needs {len}", input.len());
    assert_eq!(output.len(), len, "output holds {} elements, shape needs {len}", output.len());
    if let Some(Affine { gamma, beta }) = affine {
        assert_eq!(gamma.len(), n2, "gamma length must equal n2");
        assert_eq!(beta.len(), n2, "beta length must equal n2");
    }
    if let Some(RowStatsOut { mean, inv_std }) = &stats {
        assert_eq!(mean.len(), n1, "mean length must equal n1");
        assert_eq!(inv_std.len(), n1, "inv_std length must equal n1");
    }

    let grid_rows = launch.grid_rows();
    log::debug!(
        "layer_norm {}: {}x{}, block {}x{}, grid {} (up to {} rows per block), {:?}",
        T::DTYPE,
        n1,
        n2,
        launch.block().lanes(),
        launch.block().groups(),
        grid_rows,
        n1.div_ceil(grid_rows),
        launch.intra()
    );

    let out_addr = output.as_mut_ptr() as usize;
    let stats_addr = stats.map(|RowStatsOut { mean, inv_std }| {
        (mean.as_mut_ptr() as usize, inv_std.as_mut_ptr() as usize)
    });

    let run_block = |block_row: usize| {
        let mut ctx = BlockContext::<T::Acc>::new(launch);
        let mut rows = 0usize;
        let mut i1 = block_row;
        while i1 < n1 {
            let moments = row_statistics(&mut ctx, input, n1, n2, i1);
            let row = &input[i1 * n2..(i1 + 1) * n2];

            // SAFETY: `output` holds n1 * n2 elements and row i1 belongs to
            // block i1 % grid_rows alone, so no other block aliases it.
            let out_row =
                unsafe { std::slice::from_raw_parts_mut((out_addr as *mut T).add(i1 * n2), n2) };
            let inv_std = apply_row(&ctx, row, affine, eps, out_row);

            if let Some((mean_addr, inv_std_addr)) = stats_addr {
                // SAFETY: both buffers hold n1 elements; entry i1 has the same
                // single owner as the output row.
                unsafe {
                    *(mean_addr as *mut T::Acc).add(i1) = moments.mean;
                    *(inv_std_addr as *mut T::Acc).add(i1) = inv_std;
                }
            }

            ctx.barrier();
            rows += 1;
            i1 += grid_rows;
        }
        log::trace!("block {} normalized {} rows", block_row, rows);
    };

    #[cfg(feature = "rayon")]
    {
        let min_len = client.rayon_min_len();
        client.install_parallelism(|| {
            (0..grid_rows)
                .into_par_iter()
                .with_min_len(min_len)
                .for_each(run_block);
        });
    }

    #[cfg(not(feature = "rayon"))]
    {
        let _ = client;
        (0..grid_rows).for_each(run_block);
    }
}
