//! Compute kernels.
//!
//! Every kernel borrows its inputs read-only, partitions the work through an
//! [`Executor`](crate::parallel::Executor), and returns a newly allocated
//! result. Shape checks run before any allocation or dispatch.
//!
//! - [`matmul`]: blocked parallel matrix product
//! - [`heavy`]: repeated per-element transforms ([`ElementTransform`], [`TrigChain`])
//! - [`elementwise`]: scalar add/multiply and transpose

pub mod elementwise;
pub mod heavy;
pub mod matmul;

pub use elementwise::{add_scalar, mul_scalar, transpose};
pub use heavy::{ElementTransform, TrigChain, transform_map, transform_sum};
pub use matmul::{matmul, matrix_multiply};
