//! Blocked parallel matrix product.
//!
//! `C = A · B` with `A: m x k`, `B: k x n`. Output rows are split into bands,
//! one per worker. Inside a band the traversal is tiled over row, column and
//! reduction blocks of `block_size` elements so the active slices of `A` and
//! `Bᵀ` stay cache resident.
//!
//! Each output cell keeps a single running sum: the current value is loaded,
//! the reduction block is accumulated in ascending `k`, and the value is
//! stored back. The summation order for every cell is therefore `k = 0, 1, ..`
//! whatever the block size or worker count; tiling only changes which cells
//! are visited when.

use std::ops::Range;

use crate::data::DenseBuffer;
use crate::error::{EngineError, Result};
use crate::parallel::Executor;

use super::elementwise::transpose;

/// Multiply `a` by `b`.
///
/// # Errors
///
/// Returns a dimension error naming both shapes if `a.cols != b.rows`.
/// The check happens before anything is allocated.
pub fn matmul(
    executor: &Executor,
    a: &DenseBuffer,
    b: &DenseBuffer,
    block_size: usize,
) -> Result<DenseBuffer> {
    let (m, k) = a.shape();
    let (k_b, n) = b.shape();
    if k != k_b {
        return Err(EngineError::dimension(
            "matmul",
            format!("left is {m}x{k}, right is {k_b}x{n}; inner dimensions differ"),
        ));
    }

    let mut out = DenseBuffer::zeros(m, n)?;
    if m == 0 || n == 0 || k == 0 {
        return Ok(out);
    }

    // Bᵀ puts each output column's reduction operand in contiguous memory.
    let bt = transpose(executor, b)?;
    let block = block_size.max(1);
    let work = m.saturating_mul(n).saturating_mul(k);
    let a_data = a.as_slice();
    let bt_data = bt.as_slice();

    executor.for_each_chunk("matmul", out.as_mut_slice(), n, work, |rows, band| {
        multiply_band(a_data, bt_data, band, rows, k, n, block);
    })?;
    Ok(out)
}

/// Compute output rows `rows` into `band` (which holds exactly those rows).
fn multiply_band(
    a: &[f64],
    bt: &[f64],
    band: &mut [f64],
    rows: Range<usize>,
    k: usize,
    n: usize,
    block: usize,
) {
    let band_start = rows.start;
    for i0 in rows.clone().step_by(block) {
        let i1 = (i0 + block).min(rows.end);
        for j0 in (0..n).step_by(block) {
            let j1 = (j0 + block).min(n);
            for k0 in (0..k).step_by(block) {
                let k1 = (k0 + block).min(k);
                for i in i0..i1 {
                    let a_row = &a[i * k + k0..i * k + k1];
                    let local = i - band_start;
                    let out_row = &mut band[local * n..(local + 1) * n];
                    for (j, cell) in out_row[j0..j1].iter_mut().enumerate() {
                        let col = j0 + j;
                        let b_col = &bt[col * k + k0..col * k + k1];
                        let mut acc = *cell;
                        for (&x, &y) in a_row.iter().zip(b_col) {
                            acc += x * y;
                        }
                        *cell = acc;
                    }
                }
            }
        }
    }
}

/// Square convenience form: both inputs are flat row-major `n x n` matrices.
pub fn matrix_multiply(
    executor: &Executor,
    a: Vec<f64>,
    b: Vec<f64>,
    n: usize,
    block_size: usize,
) -> Result<Vec<f64>> {
    let a = DenseBuffer::new(a, n, n)?;
    let b = DenseBuffer::new(b, n, n)?;
    Ok(matmul(executor, &a, &b, block_size)?.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::testing::reference_matmul;
    use rstest::rstest;
    use std::num::NonZeroUsize;

    fn executor(threads: usize) -> Executor {
        let config = EngineConfig::builder()
            .n_threads(NonZeroUsize::new(threads).unwrap())
            .min_parallel_work(0)
            .build()
            .unwrap();
        Executor::from_config(&config).unwrap()
    }

    #[test]
    fn small_known_product() {
        let a = DenseBuffer::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        let b = DenseBuffer::new(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], 3, 2).unwrap();
        let c = matmul(&executor(2), &a, &b, 64).unwrap();
        assert_eq!(c.shape(), (2, 2));
        assert_eq!(c.to_vec(), vec![58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn mismatch_names_both_shapes() {
        let a = DenseBuffer::zeros(2, 3).unwrap();
        let b = DenseBuffer::zeros(4, 5).unwrap();
        let err = matmul(&Executor::global(), &a, &b, 64).unwrap_err();
        assert!(err.is_dimension());
        let msg = err.to_string();
        assert!(msg.contains("2x3"), "{msg}");
        assert!(msg.contains("4x5"), "{msg}");
    }

    #[rstest]
    #[case(0, 3, 4)]
    #[case(3, 0, 4)]
    #[case(3, 4, 0)]
    fn zero_sized_operands(#[case] m: usize, #[case] k: usize, #[case] n: usize) {
        let a = DenseBuffer::zeros(m, k).unwrap();
        let b = DenseBuffer::zeros(k, n).unwrap();
        let c = matmul(&executor(4), &a, &b, 64).unwrap();
        assert_eq!(c.shape(), (m, n));
        assert!(c.as_slice().iter().all(|&v| v == 0.0));
    }

    /// Summation order per cell is ascending k, so any blocking matches the
    /// plain triple loop bit for bit.
    #[rstest]
    #[case(1, 1)]
    #[case(3, 2)]
    #[case(7, 4)]
    #[case(64, 3)]
    fn block_size_does_not_change_result(#[case] block: usize, #[case] threads: usize) {
        let (m, k, n) = (13, 17, 11);
        let a = crate::testing::random_buffer(m, k, 1, -1.0, 1.0);
        let b = crate::testing::random_buffer(k, n, 2, -1.0, 1.0);
        let c = matmul(&executor(threads), &a, &b, block).unwrap();
        let expected = reference_matmul(&a, &b);
        assert_eq!(c.as_slice(), expected.as_slice());
    }

    #[test]
    fn matrix_multiply_square() {
        let c = matrix_multiply(
            &Executor::global(),
            vec![1.0, 2.0, 3.0, 4.0],
            vec![0.0, 1.0, 1.0, 0.0],
            2,
            64,
        )
        .unwrap();
        assert_eq!(c, vec![2.0, 1.0, 4.0, 3.0]);
    }

    #[test]
    fn matrix_multiply_rejects_wrong_length() {
        let err = matrix_multiply(&Executor::global(), vec![1.0; 3], vec![1.0; 4], 2, 64)
            .unwrap_err();
        assert!(err.is_dimension());
    }
}
