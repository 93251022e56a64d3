//! CPU implementation of normalization operations.

use crate::error::{Error, Result};
use crate::ops::{LayerNormArgs, LayerNormOut, LayerNormOutput, NormalizationOps, RowStatsOut};
use crate::runtime::LaunchConfig;
use crate::runtime::cpu::{CpuClient, kernels, kernels::RowLoad};
use num_traits::{Float, Zero};

/// Check the arguments against their declared shape, returning `n1 * n2`
fn validate_args<T: RowLoad>(args: &LayerNormArgs<'_, T>) -> Result<usize> {
    if args.n2 == 0 {
        return Err(Error::invalid_argument(
            "n2",
            "rows must contain at least one element",
        ));
    }
    let len = args
        .n1
        .checked_mul(args.n2)
        .ok_or_else(|| Error::invalid_argument("n1", "n1 * n2 overflows usize"))?;
    if args.input.len() != len {
        return Err(Error::shape_mismatch("input", len, args.input.len()));
    }
    if let Some(affine) = args.affine {
        if affine.gamma.len() != args.n2 {
            return Err(Error::shape_mismatch("gamma", args.n2, affine.gamma.len()));
        }
        if affine.beta.len() != args.n2 {
            return Err(Error::shape_mismatch("beta", args.n2, affine.beta.len()));
        }
    }
    if !Float::is_finite(args.eps) || args.eps < T::Acc::zero() {
        return Err(Error::invalid_argument(
            "eps",
            format!("must be finite and non-negative, got {:?}", args.eps),
        ));
    }
    Ok(len)
}

/// NormalizationOps implementation for the CPU runtime.
impl<T: RowLoad> NormalizationOps<T> for CpuClient {
    fn layer_norm(&self, args: &LayerNormArgs<'_, T>) -> Result<LayerNormOutput<T>> {
        let len = validate_args(args)?;
        let launch = LaunchConfig::for_rows(&self.device, args.n1)?;

        let mut output = vec![T::zeroed(); len];
        let mut mean = vec![T::Acc::default(); args.n1];
        let mut inv_std = vec![T::Acc::default(); args.n1];

        self.layer_norm_into(
            &launch,
            args,
            LayerNormOut {
                output: &mut output,
                stats: Some(RowStatsOut {
                    mean: &mut mean,
                    inv_std: &mut inv_std,
                }),
            },
        )?;

        Ok(LayerNormOutput {
            output,
            mean,
            inv_std,
        })
    }

    fn layer_norm_into(
        &self,
        launch: &LaunchConfig,
        args: &LayerNormArgs<'_, T>,
        out: LayerNormOut<'_, T>,
    ) -> Result<()> {
        let len = validate_args(args)?;
        if out.output.len() != len {
            return Err(Error::shape_mismatch("output", len, out.output.len()));
        }
        if let Some(stats) = &out.stats {
            if stats.mean.len() != args.n1 {
                return Err(Error::shape_mismatch("mean", args.n1, stats.mean.len()));
            }
            if stats.inv_std.len() != args.n1 {
                return Err(Error::shape_mismatch("inv_std", args.n1, stats.inv_std.len()));
            }
        }
        launch.validate_for(&self.device)?;

        kernels::layer_norm_kernel(
            self,
            launch,
            args.input,
            args.n1,
            args.n2,
            args.affine,
            args.eps,
            out.output,
            out.stats,
        );
        Ok(())
    }
}
