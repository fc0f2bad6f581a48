//! Error types returned by engine operations.
//!
//! Every fallible operation returns [`Result`], whose error side is
//! [`EngineError`]. Shape problems are always detected before any buffer is
//! allocated or any work is dispatched, so a failing call never leaves a
//! partially computed result behind.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors produced by the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A shape precondition was violated.
    #[error("dimension mismatch in {op}: {detail}")]
    Dimension {
        /// Operation that rejected its inputs.
        op: &'static str,
        /// Human-readable description of the offending shapes.
        detail: String,
    },

    /// A supplied value cannot be represented as an `f64`.
    #[error("cannot convert element {index} to f64: {reason}")]
    Conversion { index: usize, reason: String },

    /// At least one worker chunk did not complete.
    #[error("{op} failed in {failed} of {chunks} chunks (first failure in chunk {first_chunk}: {message})")]
    ComputeFailure {
        op: &'static str,
        failed: usize,
        chunks: usize,
        first_chunk: usize,
        message: String,
    },

    /// Invalid engine or solver configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The dedicated worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl EngineError {
    /// Shorthand for a [`EngineError::Dimension`] error.
    pub(crate) fn dimension(op: &'static str, detail: impl Into<String>) -> Self {
        Self::Dimension {
            op,
            detail: detail.into(),
        }
    }

    /// Returns `true` for shape errors.
    pub fn is_dimension(&self) -> bool {
        matches!(self, Self::Dimension { .. })
    }

    /// Returns `true` for element conversion errors.
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }

    /// Returns `true` when a worker chunk failed.
    pub fn is_compute_failure(&self) -> bool {
        matches!(self, Self::ComputeFailure { .. })
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
