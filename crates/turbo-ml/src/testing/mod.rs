//! Test utilities shared by unit tests, integration tests and benchmarks.
//!
//! - [`random_values`] / [`random_buffer`]: seeded uniform data
//! - [`reference_matmul`]: plain triple-loop product to check kernels against
//! - [`linear_targets`]: synthetic regression targets with known weights

mod data;

pub use data::{identity, linear_targets, random_buffer, random_values, reference_matmul};
