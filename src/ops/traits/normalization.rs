//! Normalization operations trait.

use crate::dtype::{Accumulate, Element};
use crate::error::{Error, Result};
use crate::runtime::LaunchConfig;

/// Default variance epsilon
pub const DEFAULT_EPS: f64 = 1e-12;

/// Per-column scale and shift, both of length `n2`
#[derive(Clone, Copy, Debug)]
pub struct Affine<'a, T> {
    /// Scale (gamma)
    pub gamma: &'a [T],
    /// Shift (beta)
    pub beta: &'a [T],
}

/// Caller-provided per-row statistics buffers, both of length `n1`
#[derive(Debug)]
pub struct RowStatsOut<'a, U> {
    /// Row means
    pub mean: &'a mut [U],
    /// Row inverse standard deviations `1 / sqrt(variance + eps)`
    pub inv_std: &'a mut [U],
}

/// Inputs of one layer normalization
#[derive(Clone, Copy, Debug)]
pub struct LayerNormArgs<'a, T: Element> {
    /// Row-major `n1 x n2` matrix
    pub input: &'a [T],
    /// Number of rows
    pub n1: usize,
    /// Row length
    pub n2: usize,
    /// Optional elementwise affine transform applied after normalization
    pub affine: Option<Affine<'a, T>>,
    /// Added to the variance before the inverse square root
    pub eps: T::Acc,
}

impl<'a, T: Element> LayerNormArgs<'a, T> {
    /// Arguments for an `n1 x n2` matrix, no affine transform, default epsilon
    pub fn new(input: &'a [T], n1: usize, n2: usize) -> Self {
        Self {
            input,
            n1,
            n2,
            affine: None,
            eps: T::Acc::from_literal(DEFAULT_EPS),
        }
    }

    /// Arguments normalizing over the last dimension of `shape`
    ///
    /// `n2` is the last dimension and `n1` the product of the leading ones
    /// (1 for a 1-D shape).
    pub fn from_shape(input: &'a [T], shape: &[usize]) -> Result<Self> {
        let Some((&n2, leading)) = shape.split_last() else {
            return Err(Error::invalid_argument(
                "shape",
                "layer norm needs at least one dimension",
            ));
        };
        let n1 = leading
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| Error::invalid_argument("shape", "element count overflows usize"))?;
        Ok(Self::new(input, n1, n2))
    }

    /// Attach gamma and beta
    pub fn with_affine(mut self, gamma: &'a [T], beta: &'a [T]) -> Self {
        self.affine = Some(Affine { gamma, beta });
        self
    }

    /// Override the variance epsilon
    pub fn with_eps(mut self, eps: T::Acc) -> Self {
        self.eps = eps;
        self
    }
}

/// Caller-provided destination of [`NormalizationOps::layer_norm_into`]
#[derive(Debug)]
pub struct LayerNormOut<'a, T: Element> {
    /// Normalized matrix, same length as the input
    pub output: &'a mut [T],
    /// Per-row statistics; skipped when absent
    pub stats: Option<RowStatsOut<'a, T::Acc>>,
}

/// Owned result of [`NormalizationOps::layer_norm`]
#[derive(Clone, Debug, PartialEq)]
pub struct LayerNormOutput<T: Element> {
    /// Normalized matrix
    pub output: Vec<T>,
    /// Row means
    pub mean: Vec<T::Acc>,
    /// Row inverse standard deviations
    pub inv_std: Vec<T::Acc>,
}

/// Normalization operations
pub trait NormalizationOps<T: Element> {
    /// Layer Normalization: output = (input - mean) * inv_std * gamma + beta
    ///
    /// Statistics are taken over each row of `n2` elements with the biased
    /// variance. The launch is derived from the client's device.
    fn layer_norm(&self, args: &LayerNormArgs<'_, T>) -> Result<LayerNormOutput<T>>;

    /// Layer normalization into caller buffers with an explicit launch
    ///
    /// Shapes and the launch are validated before any buffer is touched.
    fn layer_norm_into(
        &self,
        launch: &LaunchConfig,
        args: &LayerNormArgs<'_, T>,
        out: LayerNormOut<'_, T>,
    ) -> Result<()>;
}
