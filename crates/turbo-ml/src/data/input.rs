//! Host-boundary construction.
//!
//! Callers hand matrices over in one of a few shapes. [`MatrixInput`] names
//! each of them explicitly and is resolved once into a [`DenseBuffer`], so
//! nothing past the boundary needs to inspect what kind of input it got.

use crate::error::Result;

use super::DenseBuffer;

// =============================================================================
// Element conversion
// =============================================================================

/// Largest integer magnitude every value up to which is exactly representable in `f64`.
const MAX_EXACT_INT: u64 = 1 << f64::MANTISSA_DIGITS;

/// Conversion of a host value into the engine's element type.
///
/// Conversions never round silently: integers outside `±2^53` and strings
/// that do not parse as a number are rejected. NaN and infinities are valid
/// `f64` values and pass through.
pub trait IntoElement {
    /// Convert to `f64`, or describe why the value has no `f64` equivalent.
    fn into_element(self) -> std::result::Result<f64, String>;
}

impl IntoElement for f64 {
    #[inline]
    fn into_element(self) -> std::result::Result<f64, String> {
        Ok(self)
    }
}

macro_rules! lossless_into_element {
    ($($t:ty),*) => {
        $(
            impl IntoElement for $t {
                #[inline]
                fn into_element(self) -> std::result::Result<f64, String> {
                    Ok(f64::from(self))
                }
            }
        )*
    };
}

lossless_into_element!(f32, i8, i16, i32, u8, u16, u32);

macro_rules! checked_int_into_element {
    ($($t:ty),*) => {
        $(
            impl IntoElement for $t {
                fn into_element(self) -> std::result::Result<f64, String> {
                    if (self as i128).unsigned_abs() <= MAX_EXACT_INT as u128 {
                        Ok(self as f64)
                    } else {
                        Err(format!("integer {} is not exactly representable", self))
                    }
                }
            }
        )*
    };
}

checked_int_into_element!(i64, u64, isize, usize);

impl IntoElement for &str {
    fn into_element(self) -> std::result::Result<f64, String> {
        self.trim()
            .parse::<f64>()
            .map_err(|e| format!("{:?} is not a number ({})", self, e))
    }
}

impl IntoElement for String {
    fn into_element(self) -> std::result::Result<f64, String> {
        self.as_str().into_element()
    }
}

// =============================================================================
// MatrixInput
// =============================================================================

/// The ways a host can describe a matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixInput {
    /// One `Vec` per row; all rows must have the same length.
    NestedRows(Vec<Vec<f64>>),
    /// Row-major values with an explicit shape.
    FlatWithShape {
        values: Vec<f64>,
        rows: usize,
        cols: usize,
    },
    /// A flat list read as an `n x 1` column vector.
    FlatColumn(Vec<f64>),
    /// An already constructed buffer, passed through unchanged.
    Existing(DenseBuffer),
}

impl MatrixInput {
    /// Resolve into an owned buffer.
    ///
    /// # Errors
    ///
    /// Returns a dimension error for ragged rows or a length that does not
    /// match the declared shape.
    pub fn into_buffer(self) -> Result<DenseBuffer> {
        match self {
            MatrixInput::NestedRows(rows) => DenseBuffer::from_rows(rows),
            MatrixInput::FlatWithShape { values, rows, cols } => {
                DenseBuffer::new(values, rows, cols)
            }
            MatrixInput::FlatColumn(values) => Ok(DenseBuffer::column(values)),
            MatrixInput::Existing(buffer) => Ok(buffer),
        }
    }
}

impl From<Vec<Vec<f64>>> for MatrixInput {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        MatrixInput::NestedRows(rows)
    }
}

impl From<Vec<f64>> for MatrixInput {
    fn from(values: Vec<f64>) -> Self {
        MatrixInput::FlatColumn(values)
    }
}

impl From<DenseBuffer> for MatrixInput {
    fn from(buffer: DenseBuffer) -> Self {
        MatrixInput::Existing(buffer)
    }
}

impl TryFrom<MatrixInput> for DenseBuffer {
    type Error = crate::error::EngineError;

    fn try_from(input: MatrixInput) -> Result<Self> {
        input.into_buffer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(3i32.into_element(), 3.0)]
    #[case(1.5f32.into_element(), 1.5)]
    #[case((-7i64).into_element(), -7.0)]
    #[case((1u64 << 53).into_element(), 9_007_199_254_740_992.0)]
    #[case(" 2.25 ".into_element(), 2.25)]
    #[case(String::from("-1e3").into_element(), -1000.0)]
    fn converts_representable_values(
        #[case] converted: std::result::Result<f64, String>,
        #[case] expected: f64,
    ) {
        assert_eq!(converted, Ok(expected));
    }

    #[rstest]
    #[case((1u64 << 53) + 1)]
    #[case(u64::MAX)]
    fn rejects_inexact_integers(#[case] value: u64) {
        assert!(value.into_element().is_err());
    }

    #[test]
    fn rejects_negative_inexact_integer() {
        assert!(i64::MIN.into_element().is_err());
    }

    #[test]
    fn rejects_non_numeric_strings() {
        let err = "abc".into_element().unwrap_err();
        assert!(err.contains("\"abc\""));
    }

    #[test]
    fn string_nan_passes_through() {
        assert!("NaN".into_element().unwrap().is_nan());
    }

    #[test]
    fn nested_rows_resolve() {
        let buf = MatrixInput::from(vec![vec![1.0, 2.0], vec![3.0, 4.0]])
            .into_buffer()
            .unwrap();
        assert_eq!(buf.shape(), (2, 2));
    }

    #[test]
    fn flat_list_is_a_column() {
        let buf = MatrixInput::from(vec![1.0, 2.0, 3.0]).into_buffer().unwrap();
        assert_eq!(buf.shape(), (3, 1));
    }

    #[test]
    fn flat_with_shape_checks_length() {
        let input = MatrixInput::FlatWithShape {
            values: vec![1.0; 5],
            rows: 2,
            cols: 3,
        };
        assert!(input.into_buffer().unwrap_err().is_dimension());
    }

    #[test]
    fn existing_passes_through() {
        let original = DenseBuffer::new(vec![1.0, 2.0], 1, 2).unwrap();
        let resolved = DenseBuffer::try_from(MatrixInput::from(original.clone())).unwrap();
        assert_eq!(resolved, original);
    }
}
