//! Half-precision rows whose base is not 4-byte aligned
#![cfg(feature = "f16")]

mod common;

use common::{assert_allclose_f32, create_cpu_client, reference_row_stats, test_matrix};
use fusednorm::prelude::*;
use half::f16;

fn misalignment(row: &[f16]) -> usize {
    row.as_ptr() as usize & 3
}

#[test]
fn test_misaligned_row_base_matches_aligned() {
    let (client, _device) = create_cpu_client();
    for n2 in [1usize, 7, 8, 9, 64, 257] {
        let values: Vec<f16> = test_matrix(1, n2, 1.0, 3.0, n2 as u64)
            .iter()
            .map(|&v| f16::from_f64(v))
            .collect();

        // The same values starting one element apart in one buffer
        let mut buf = vec![f16::ZERO; n2 + 1];
        buf[..n2].copy_from_slice(&values);
        let first = client
            .layer_norm(&LayerNormArgs::new(&buf[..n2], 1, n2).with_eps(1e-5))
            .unwrap();
        let first_offset = misalignment(&buf[..n2]);

        buf[1..].copy_from_slice(&values);
        let second = client
            .layer_norm(&LayerNormArgs::new(&buf[1..], 1, n2).with_eps(1e-5))
            .unwrap();
        assert_ne!(first_offset, misalignment(&buf[1..]));

        assert!((first.mean[0] - second.mean[0]).abs() < 1e-5, "n2={n2}");
        assert!(
            (first.inv_std[0] - second.inv_std[0]).abs() < 1e-4 * first.inv_std[0],
            "n2={n2}"
        );
        let a: Vec<f32> = first.output.iter().map(|v| v.to_f32()).collect();
        let b: Vec<f32> = second.output.iter().map(|v| v.to_f32()).collect();
        assert_allclose_f32(&a, &b, 2e-3, 2e-3, "aligned vs misaligned");
    }
}

#[test]
fn test_half_statistics_match_reference() {
    let (client, _device) = create_cpu_client();
    let (n1, n2) = (3, 301);
    let values: Vec<f16> = test_matrix(n1, n2, -2.0, 1.5, 99)
        .iter()
        .map(|&v| f16::from_f64(v))
        .collect();
    let widened: Vec<f64> = values.iter().map(|v| v.to_f64()).collect();

    // Odd n2 puts every other row on a misaligned base
    let out = client.layer_norm(&LayerNormArgs::new(&values, n1, n2)).unwrap();
    for (i, &(mean, var)) in reference_row_stats(&widened, n1, n2).iter().enumerate() {
        assert!((out.mean[i] as f64 - mean).abs() < 1e-4, "row {i}");
        let inv_std = 1.0 / (var + 1e-12).sqrt();
        assert!(
            (out.inv_std[i] as f64 - inv_std).abs() < 1e-4 * inv_std,
            "row {i}"
        );
    }
}
