//! Linear regression by fixed-iteration batch gradient descent.
//!
//! - [`SolverConfig`]: learning rate, pass count and logging
//! - [`Solver`]: owns the weights, fits and predicts

mod config;
mod gd;

pub use config::{SolverConfig, SolverConfigBuilder};
pub use gd::Solver;
