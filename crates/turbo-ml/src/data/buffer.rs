//! Dense row-major `f64` storage.
//!
//! [`DenseBuffer`] is the only matrix type the kernels consume and produce.
//! Rows are contiguous: `index = row * n_cols + col`.
//!
//! # Example
//!
//! ```
//! use turbo_ml::DenseBuffer;
//!
//! let buf = DenseBuffer::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
//! assert_eq!(buf.shape(), (2, 3));
//! assert_eq!(buf.row(1), &[4.0, 5.0, 6.0]);
//! assert_eq!(buf.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! ```

use ndarray::{Array2, ArrayView2};

use crate::error::{EngineError, Result};

use super::input::IntoElement;

/// Largest accepted row or column count.
///
/// Every accepted shape can be handed to ndarray and copied out row by row.
pub const MAX_AXIS_LEN: usize = isize::MAX as usize / std::mem::size_of::<Vec<f64>>();

/// Element count for a `rows x cols` shape that fits in memory.
fn checked_len(rows: usize, cols: usize) -> Result<usize> {
    if rows > MAX_AXIS_LEN || cols > MAX_AXIS_LEN {
        return Err(EngineError::dimension(
            "construct",
            format!("{rows}x{cols} exceeds the maximum axis length {MAX_AXIS_LEN}"),
        ));
    }
    let fits = |len: &usize| {
        len.checked_mul(std::mem::size_of::<f64>())
            .is_some_and(|bytes| bytes <= isize::MAX as usize)
    };
    rows.checked_mul(cols)
        .filter(fits)
        .ok_or_else(|| EngineError::dimension("construct", format!("{rows}x{cols} is too large")))
}

fn length_mismatch(len: usize, rows: usize, cols: usize) -> EngineError {
    EngineError::dimension(
        "construct",
        format!("data length {len} does not match dimensions {rows}x{cols}"),
    )
}

/// Owned, contiguous, row-major matrix of `f64`.
///
/// The invariant `len == rows * cols` is checked by every constructor.
/// Buffers with zero rows or zero columns are valid and empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseBuffer {
    data: Box<[f64]>,
    n_rows: usize,
    n_cols: usize,
}

impl DenseBuffer {
    /// Create a buffer from row-major values, taking ownership.
    ///
    /// # Errors
    ///
    /// Returns a dimension error if `values.len() != rows * cols`, or if
    /// either axis exceeds [`MAX_AXIS_LEN`].
    pub fn new(values: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        let expected = checked_len(rows, cols)?;
        if values.len() != expected {
            return Err(length_mismatch(values.len(), rows, cols));
        }
        Ok(Self {
            data: values.into_boxed_slice(),
            n_rows: rows,
            n_cols: cols,
        })
    }

    /// Create a buffer from values of any convertible element type.
    ///
    /// Shape is checked first, then each element is converted.
    ///
    /// # Errors
    ///
    /// - dimension error if the length does not match `rows * cols`
    /// - conversion error naming the first element that has no `f64` value
    pub fn from_elements<T: IntoElement>(values: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if checked_len(rows, cols)? != values.len() {
            return Err(length_mismatch(values.len(), rows, cols));
        }
        let data = values
            .into_iter()
            .enumerate()
            .map(|(index, v)| {
                v.into_element()
                    .map_err(|reason| EngineError::Conversion { index, reason })
            })
            .collect::<Result<Vec<f64>>>()?;
        Self::new(data, rows, cols)
    }

    /// Create a buffer from nested rows.
    ///
    /// An empty outer list gives a `0 x 0` buffer.
    ///
    /// # Errors
    ///
    /// Returns a dimension error if the rows have different lengths.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(EngineError::dimension(
                "construct",
                format!("row {} has {} values, expected {}", i, row.len(), n_cols),
            ));
        }
        let data: Vec<f64> = rows.into_iter().flatten().collect();
        Self::new(data, n_rows, n_cols)
    }

    /// Create an `n x 1` column from a flat list.
    pub fn column(values: Vec<f64>) -> Self {
        let n = values.len();
        Self {
            data: values.into_boxed_slice(),
            n_rows: n,
            n_cols: 1,
        }
    }

    /// Zero-filled buffer.
    ///
    /// # Errors
    ///
    /// Returns a dimension error if the shape is too large to allocate.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        let len = checked_len(rows, cols)?;
        Ok(Self {
            data: vec![0.0; len].into_boxed_slice(),
            n_rows: rows,
            n_cols: cols,
        })
    }

    /// Wrap storage whose length is already known to match.
    pub(crate) fn from_parts(data: Vec<f64>, n_rows: usize, n_cols: usize) -> Self {
        debug_assert_eq!(data.len(), n_rows * n_cols);
        Self {
            data: data.into_boxed_slice(),
            n_rows,
            n_cols,
        }
    }

    // =========================================================================
    // Shape
    // =========================================================================

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Row-major contents.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Element at `(row, col)`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.n_rows && col < self.n_cols {
            Some(self.data[row * self.n_cols + col])
        } else {
            None
        }
    }

    /// Contiguous slice of row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_rows`.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.n_rows, "row {} out of bounds ({} rows)", i, self.n_rows);
        let start = i * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    /// Iterate over rows.
    ///
    /// Yields exactly `n_rows` slices, including for zero-column buffers.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Flat copy of the contents.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.to_vec()
    }

    /// Nested copy of the contents, one `Vec` per row.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    /// Consume the buffer and return its storage.
    pub fn into_vec(self) -> Vec<f64> {
        self.data.into_vec()
    }

    /// Zero-copy ndarray view with shape `[rows, cols]`.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        ArrayView2::from_shape((self.n_rows, self.n_cols), &self.data)
            .expect("buffer length matches shape")
    }

    /// Owned ndarray copy.
    pub fn to_array(&self) -> Array2<f64> {
        self.view().to_owned()
    }
}

impl From<Array2<f64>> for DenseBuffer {
    fn from(array: Array2<f64>) -> Self {
        let (n_rows, n_cols) = array.dim();
        // Logical iteration order is row-major whatever the memory layout.
        let data: Vec<f64> = array.iter().copied().collect();
        Self::from_parts(data, n_rows, n_cols)
    }
}
