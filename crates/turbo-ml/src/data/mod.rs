//! Matrix storage and host-boundary construction.
//!
//! - [`DenseBuffer`]: owned row-major `f64` storage with a `(rows, cols)` shape
//! - [`MatrixInput`]: the explicit input variants a host may pass
//! - [`IntoElement`]: checked conversion of host values to `f64`

mod buffer;
mod input;

pub use buffer::DenseBuffer;
pub use input::{IntoElement, MatrixInput};
