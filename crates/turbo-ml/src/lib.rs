//! turbo-ml: parallel numeric kernels for machine-learning workloads.
//!
//! Dense `f64` matrices, a blocked parallel matrix product, repeated
//! per-element transforms, and linear regression by batch gradient descent,
//! all dispatched over a bounded rayon worker pool.
//!
//! # Key Types
//!
//! - [`DenseBuffer`] - owned row-major matrix storage
//! - [`Engine`] / [`EngineConfig`] - dispatch settings and the kernel entry points
//! - [`Solver`] / [`SolverConfig`] - gradient-descent linear regression
//! - [`EngineError`] - every failure the crate reports
//!
//! # Quick Start
//!
//! The free functions run on a default engine over the global pool:
//!
//! ```
//! use turbo_ml::DenseBuffer;
//!
//! let a = DenseBuffer::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
//! let b = DenseBuffer::new(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], 3, 2).unwrap();
//! let c = turbo_ml::matmul(&a, &b).unwrap();
//! assert_eq!(c.to_rows(), vec![vec![58.0, 64.0], vec![139.0, 154.0]]);
//!
//! let total = turbo_ml::heavy_transform(&[1.0, 2.0, 3.0], 0).unwrap();
//! assert_eq!(total, 6.0);
//! ```
//!
//! Use [`Engine::new`] for a dedicated pool or a different block size.

// Re-export approx traits for users who want to compare results
pub use approx;

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod kernels;
pub mod logger;
pub mod parallel;
pub mod solver;
pub mod testing;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use config::{ConfigError, EngineConfig};
pub use data::{DenseBuffer, IntoElement, MatrixInput};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use kernels::{ElementTransform, TrigChain};
pub use logger::Verbosity;
pub use parallel::{Executor, WorkPartition};
pub use solver::{Solver, SolverConfig};
pub use utils::Parallelism;

// =============================================================================
// Free functions on the default engine
// =============================================================================

/// `a · b` on the global pool. See [`Engine::matmul`].
pub fn matmul(a: &DenseBuffer, b: &DenseBuffer) -> Result<DenseBuffer> {
    Engine::default().matmul(a, b)
}

/// Square product of two flat row-major `n x n` matrices on the global pool.
pub fn matrix_multiply(a: Vec<f64>, b: Vec<f64>, n: usize) -> Result<Vec<f64>> {
    Engine::default().matrix_multiply(a, b, n)
}

/// Sum of [`TrigChain`] applied `repeat` times to each value.
pub fn heavy_transform(values: &[f64], repeat: usize) -> Result<f64> {
    Engine::default().heavy_transform(values, repeat)
}

/// [`TrigChain`] applied `repeat` times to each value, as an `n x 1` buffer.
pub fn heavy_map(values: &[f64], repeat: usize) -> Result<DenseBuffer> {
    Engine::default().heavy_map(values, repeat)
}

pub fn transpose(x: &DenseBuffer) -> Result<DenseBuffer> {
    Engine::default().transpose(x)
}

pub fn add_scalar(x: &DenseBuffer, value: f64) -> Result<DenseBuffer> {
    Engine::default().add_scalar(x, value)
}

pub fn mul_scalar(x: &DenseBuffer, value: f64) -> Result<DenseBuffer> {
    Engine::default().mul_scalar(x, value)
}
