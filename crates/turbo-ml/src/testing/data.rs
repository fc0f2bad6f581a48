use rand::prelude::*;

use crate::data::DenseBuffer;

/// Generate `len` seeded values uniform in `[min, max)`.
pub fn random_values(len: usize, seed: u64, min: f64, max: f64) -> Vec<f64> {
    assert!(max >= min);
    let mut rng = StdRng::seed_from_u64(seed);
    let width = max - min;
    (0..len).map(|_| min + rng.r#gen::<f64>() * width).collect()
}

/// Create a `rows x cols` [`DenseBuffer`] of seeded uniform values.
pub fn random_buffer(rows: usize, cols: usize, seed: u64, min: f64, max: f64) -> DenseBuffer {
    DenseBuffer::from_parts(random_values(rows * cols, seed, min, max), rows, cols)
}

/// `n x n` identity matrix.
pub fn identity(n: usize) -> DenseBuffer {
    let mut data = vec![0.0; n * n];
    for i in 0..n {
        data[i * n + i] = 1.0;
    }
    DenseBuffer::from_parts(data, n, n)
}

/// Naive `a · b` with each cell summed over ascending `k` from `0.0`.
///
/// Panics if the inner dimensions differ.
pub fn reference_matmul(a: &DenseBuffer, b: &DenseBuffer) -> DenseBuffer {
    let (m, k) = a.shape();
    let (k_b, n) = b.shape();
    assert_eq!(k, k_b, "inner dimensions differ");

    let a_data = a.as_slice();
    let b_data = b.as_slice();
    let mut out = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0;
            for p in 0..k {
                acc += a_data[i * k + p] * b_data[p * n + j];
            }
            out[i * n + j] = acc;
        }
    }
    DenseBuffer::from_parts(out, m, n)
}

/// Regression targets from a random linear model of `x` plus uniform noise.
///
/// Returns `(targets, weights, bias)`.
pub fn linear_targets(
    x: &DenseBuffer,
    seed: u64,
    noise_amplitude: f64,
) -> (Vec<f64>, Vec<f64>, f64) {
    let mut rng = StdRng::seed_from_u64(seed);

    let weights: Vec<f64> = (0..x.n_cols()).map(|_| rng.r#gen::<f64>() * 2.0 - 1.0).collect();
    let bias = rng.r#gen::<f64>() * 0.5 - 0.25;

    let targets = x
        .rows()
        .map(|row| {
            let mut y = bias;
            for (v, w) in row.iter().zip(&weights) {
                y += v * w;
            }
            if noise_amplitude > 0.0 {
                y += (rng.r#gen::<f64>() * 2.0 - 1.0) * noise_amplitude;
            }
            y
        })
        .collect();

    (targets, weights, bias)
}
