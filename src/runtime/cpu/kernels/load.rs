//! Strided row loads folding into per-worker accumulators
//!
//! Worker `thrx` of `numx` owns the chunks starting at `CHUNK * thrx`,
//! `CHUNK * (thrx + numx)`, ... and every element past the last full chunk
//! that is congruent to `thrx` modulo `numx`. Across all workers each element
//! of the row is folded exactly once.

use crate::algorithm::WelfordState;
use crate::dtype::Element;

/// Storage types that know how to fold their share of a row
pub trait RowLoad: Element {
    /// Elements per vectorized chunk
    const CHUNK: usize;

    /// Fold worker `thrx`'s elements of `row` into `acc`
    fn fold_worker(row: &[Self], thrx: usize, numx: usize, acc: &mut WelfordState<Self::Acc>);
}

/// Chunked fold shared by the single- and double-precision paths
#[inline]
pub fn fold_chunked<T: Element, const CHUNK: usize>(
    row: &[T],
    thrx: usize,
    numx: usize,
    acc: &mut WelfordState<T::Acc>,
) {
    let n2 = row.len();
    let mut l = CHUNK * thrx;
    while l + CHUNK <= n2 {
        for &x in &row[l..l + CHUNK] {
            acc.online_update(x.to_acc());
        }
        l += CHUNK * numx;
    }
    let mut l = (n2 / CHUNK) * CHUNK + thrx;
    while l < n2 {
        acc.online_update(row[l].to_acc());
        l += numx;
    }
}

impl RowLoad for f32 {
    const CHUNK: usize = 4;

    #[inline]
    fn fold_worker(row: &[Self], thrx: usize, numx: usize, acc: &mut WelfordState<f32>) {
        fold_chunked::<f32, 4>(row, thrx, numx, acc);
    }
}

impl RowLoad for f64 {
    const CHUNK: usize = 4;

    #[inline]
    fn fold_worker(row: &[Self], thrx: usize, numx: usize, acc: &mut WelfordState<f32>) {
        fold_chunked::<f64, 4>(row, thrx, numx, acc);
    }
}

#[cfg(feature = "f16")]
impl RowLoad for half::f16 {
    const CHUNK: usize = 8;

    #[inline]
    fn fold_worker(row: &[Self], thrx: usize, numx: usize, acc: &mut WelfordState<f32>) {
        fold_half_pairs(row, thrx, numx, acc);
    }
}

/// Half-precision fold reading two elements per 32-bit word
///
/// A row that does not start on a 4-byte boundary has its first element
/// folded by worker 0 alone; the remainder is then aligned and is split
/// into chunks the same way as an aligned row.
#[cfg(feature = "f16")]
pub fn fold_half_pairs(
    row: &[half::f16],
    thrx: usize,
    numx: usize,
    acc: &mut WelfordState<f32>,
) {
    const CHUNK: usize = 8;

    let mut rest = row;
    if (row.as_ptr() as usize) & 3 != 0 && !row.is_empty() {
        if thrx == 0 {
            acc.online_update(row[0].to_f32());
        }
        rest = &row[1..];
    }

    let n2 = rest.len();
    let mut l = CHUNK * thrx;
    while l + CHUNK <= n2 {
        let chunk = &rest[l..l + CHUNK];
        match bytemuck::try_cast_slice::<half::f16, u32>(chunk) {
            Ok(words) => {
                for &word in words {
                    let pair: [half::f16; 2] = bytemuck::cast(word);
                    acc.online_update(pair[0].to_f32());
                    acc.online_update(pair[1].to_f32());
                }
            }
            Err(_) => {
                for &x in chunk {
                    acc.online_update(x.to_f32());
                }
            }
        }
        l += CHUNK * numx;
    }
    let mut l = (n2 / CHUNK) * CHUNK + thrx;
    while l < n2 {
        acc.online_update(rest[l].to_f32());
        l += numx;
    }
}
