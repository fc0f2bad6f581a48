//! Engine configuration with builder pattern.
//!
//! [`EngineConfig`] controls how kernels are dispatched: the worker count,
//! the amount of work below which a call stays on the calling thread, and the
//! matmul block edge. It uses the `bon` crate for builder generation with
//! validation at build time.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use turbo_ml::EngineConfig;
//!
//! // All defaults: global rayon pool, 64-wide matmul blocks
//! let config = EngineConfig::builder().build().unwrap();
//!
//! // Dedicated 4-thread pool, smaller blocks
//! let config = EngineConfig::builder()
//!     .n_threads(NonZeroUsize::new(4).unwrap())
//!     .block_size(32)
//!     .build()
//!     .unwrap();
//! ```

use std::num::NonZeroUsize;

use bon::Builder;
use thiserror::Error;

use crate::logger::Verbosity;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Learning rate must be finite and positive.
    #[error("learning_rate must be finite and positive, got {0}")]
    InvalidLearningRate(f64),

    /// Matmul block edge must be at least 1.
    #[error("block_size must be at least 1")]
    InvalidBlockSize,

    /// Logging interval must be at least 1.
    #[error("log_interval must be at least 1")]
    InvalidLogInterval,
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Default amount of work (roughly, scalar operations) below which a call
/// runs single-threaded.
pub const DEFAULT_MIN_PARALLEL_WORK: usize = 16 * 1024;

/// Default matmul block edge, in elements.
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Dispatch configuration for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct EngineConfig {
    /// Number of worker threads. `None` uses the global rayon pool, which is
    /// sized to the available hardware parallelism.
    pub n_threads: Option<NonZeroUsize>,

    /// Work estimate below which a call runs on the calling thread.
    /// Default: 16384.
    #[builder(default = DEFAULT_MIN_PARALLEL_WORK)]
    pub min_parallel_work: usize,

    /// Matmul block edge in elements. Default: 64.
    #[builder(default = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,

    /// Verbosity of dispatch logging. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

impl<S: engine_config_builder::IsComplete> EngineConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBlockSize`] if `block_size == 0`.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl EngineConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::InvalidBlockSize);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_threads: None,
            min_parallel_work: DEFAULT_MIN_PARALLEL_WORK,
            block_size: DEFAULT_BLOCK_SIZE,
            verbosity: Verbosity::default(),
        }
    }
}
