//! Welford online moments and Chan's parallel merge
//!
//! `WelfordState` is the only place the moment arithmetic lives. Every
//! reduction tree in the crate (lane rotation, lane butterfly, scratch
//! halving) goes through [`Combine::combine`], so a tree can be reshaped
//! without touching the formulas below.

use crate::dtype::Accumulate;

/// Associative, commutative merge of two partial results over disjoint sets
pub trait Combine: Copy {
    /// Merge `other` into `self`, returning the result for the union
    fn combine(self, other: Self) -> Self;
}

/// Running `(mean, m2, count)` triple
///
/// `m2` is the sum of squared deviations from the running mean, not a raw
/// sum of squares. For the values folded so far, `mean` is their mean and
/// `m2 / count` their biased variance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WelfordState<U> {
    /// Mean of the values seen so far
    pub mean: U,
    /// Sum of squared deviations from `mean`
    pub m2: U,
    /// Number of values seen so far
    pub count: U,
}

impl<U: Accumulate> WelfordState<U> {
    /// State of the empty set
    #[inline]
    pub fn empty() -> Self {
        Self {
            mean: U::zero(),
            m2: U::zero(),
            count: U::zero(),
        }
    }

    /// Fold a slice of values in order
    pub fn from_values(values: &[U]) -> Self {
        let mut state = Self::empty();
        for &x in values {
            state.online_update(x);
        }
        state
    }

    /// Extend the set by one value
    #[inline]
    pub fn online_update(&mut self, x: U) {
        self.count = self.count + U::one();
        let delta = x - self.mean;
        self.mean = self.mean + delta / self.count;
        self.m2 = self.m2 + delta * (x - self.mean);
    }

    /// Biased variance `m2 / count` (zero for the empty set)
    #[inline]
    pub fn variance(&self) -> U {
        if self.count > U::zero() {
            self.m2 / self.count
        } else {
            U::zero()
        }
    }

    /// Finalize against a known row length
    ///
    /// The divisor is the row length rather than the merged count; both are
    /// equal once every element of the row has been folded.
    #[inline]
    pub fn finalize(&self, n2: usize) -> RowMoments<U> {
        RowMoments {
            mean: self.mean,
            variance: self.m2 / U::from_count(n2),
        }
    }
}

impl<U: Accumulate> Combine for WelfordState<U> {
    #[inline]
    fn combine(self, other: Self) -> Self {
        let count = self.count + other.count;
        if count > U::zero() {
            let n_a = self.count / count;
            let n_b = other.count / count;
            let delta = other.mean - self.mean;
            Self {
                // n_a*mean_a + n_b*mean_b, kept exact when delta == 0
                mean: self.mean + delta * n_b,
                m2: self.m2 + other.m2 + delta * delta * n_a * n_b * count,
                count,
            }
        } else {
            Self::empty()
        }
    }
}

/// Finalized statistics of one row
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RowMoments<U> {
    /// Row mean
    pub mean: U,
    /// Biased row variance
    pub variance: U,
}

impl<U: Accumulate> RowMoments<U> {
    /// Inert statistics handed to workers whose row index is out of range
    #[inline]
    pub fn zero() -> Self {
        Self {
            mean: U::zero(),
            variance: U::zero(),
        }
    }

    /// `1 / sqrt(variance + eps)`
    #[inline]
    pub fn inv_std(&self, eps: U) -> U {
        (self.variance + eps).rsqrt()
    }
}
