//! Common test utilities
#![allow(dead_code)]

use fusednorm::runtime::cpu::{CpuClient, CpuDevice};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuClient::new(device.clone());
    (client, device)
}

/// Assert two f32 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Two-pass mean and biased variance of every row, in f64
pub fn reference_row_stats(input: &[f64], n1: usize, n2: usize) -> Vec<(f64, f64)> {
    (0..n1)
        .map(|i| {
            let row = &input[i * n2..(i + 1) * n2];
            let mean = row.iter().sum::<f64>() / n2 as f64;
            let var = row.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n2 as f64;
            (mean, var)
        })
        .collect()
}

/// Reference layer norm in f64
pub fn reference_layer_norm(
    input: &[f64],
    n1: usize,
    n2: usize,
    gamma: Option<&[f64]>,
    beta: Option<&[f64]>,
    eps: f64,
) -> Vec<f64> {
    let stats = reference_row_stats(input, n1, n2);
    let mut out = vec![0.0; n1 * n2];
    for (i, &(mean, var)) in stats.iter().enumerate() {
        let inv_std = 1.0 / (var + eps).sqrt();
        for j in 0..n2 {
            let mut y = (input[i * n2 + j] - mean) * inv_std;
            if let (Some(g), Some(b)) = (gamma, beta) {
                y = g[j] * y + b[j];
            }
            out[i * n2 + j] = y;
        }
    }
    out
}

/// Seeded values in `offset ± scale`
pub fn test_matrix(n1: usize, n2: usize, offset: f64, scale: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n1 * n2)
        .map(|_| offset + scale * rng.random_range(-1.0..1.0))
        .collect()
}
