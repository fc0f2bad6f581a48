//! Shape-preserving elementwise operations and transpose.

use crate::data::DenseBuffer;
use crate::error::Result;
use crate::parallel::Executor;

/// Apply `f` to every element of `src`, writing a new vector.
///
/// Chunks of the output are filled in parallel; element `i` of the output
/// depends only on element `i` of the input.
pub(crate) fn map_values<F>(
    executor: &Executor,
    op: &'static str,
    src: &[f64],
    work: usize,
    f: F,
) -> Result<Vec<f64>>
where
    F: Fn(f64) -> f64 + Sync,
{
    let mut out = vec![0.0; src.len()];
    executor.for_each_chunk(op, &mut out, 1, work, |range, band| {
        for (dst, &x) in band.iter_mut().zip(&src[range]) {
            *dst = f(x);
        }
    })?;
    Ok(out)
}

/// `x + value` for every element.
pub fn add_scalar(executor: &Executor, x: &DenseBuffer, value: f64) -> Result<DenseBuffer> {
    let data = map_values(executor, "add_scalar", x.as_slice(), x.len(), |v| v + value)?;
    Ok(DenseBuffer::from_parts(data, x.n_rows(), x.n_cols()))
}

/// `x * value` for every element.
pub fn mul_scalar(executor: &Executor, x: &DenseBuffer, value: f64) -> Result<DenseBuffer> {
    let data = map_values(executor, "mul_scalar", x.as_slice(), x.len(), |v| v * value)?;
    Ok(DenseBuffer::from_parts(data, x.n_rows(), x.n_cols()))
}

/// Transpose into a new `cols x rows` buffer.
///
/// Output rows (input columns) are split across workers.
pub fn transpose(executor: &Executor, x: &DenseBuffer) -> Result<DenseBuffer> {
    let (rows, cols) = x.shape();
    let mut out = DenseBuffer::zeros(cols, rows)?;
    if out.is_empty() {
        return Ok(out);
    }

    let src = x.as_slice();
    executor.for_each_chunk("transpose", out.as_mut_slice(), rows, x.len(), |out_rows, band| {
        for (local, col) in out_rows.enumerate() {
            let dst = &mut band[local * rows..(local + 1) * rows];
            for (row, value) in dst.iter_mut().enumerate() {
                *value = src[row * cols + col];
            }
        }
    })?;
    Ok(out)
}
