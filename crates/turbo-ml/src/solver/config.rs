//! Solver configuration.
//!
//! ```
//! use turbo_ml::solver::SolverConfig;
//! use turbo_ml::Verbosity;
//!
//! let config = SolverConfig::builder()
//!     .learning_rate(0.1)
//!     .iterations(2_000)
//!     .verbosity(Verbosity::Info)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.iterations, 2_000);
//! ```

use bon::Builder;

use crate::config::ConfigError;
use crate::logger::Verbosity;

/// Hyperparameters for fixed-iteration gradient descent.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct SolverConfig {
    /// Step size applied to the mean gradient. Default: 0.01.
    #[builder(default = 0.01)]
    pub learning_rate: f64,

    /// Exact number of passes over the data. Default: 1000.
    ///
    /// There is no convergence test; every fit runs all passes.
    #[builder(default = 1000)]
    pub iterations: usize,

    /// Log progress every this many passes at `Info`. Default: 100.
    #[builder(default = 100)]
    pub log_interval: usize,

    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

impl<S: solver_config_builder::IsComplete> SolverConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidLearningRate`] if the rate is not finite and positive
    /// - [`ConfigError::InvalidLogInterval`] if `log_interval == 0`
    pub fn build(self) -> Result<SolverConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl SolverConfig {
    /// Unvalidated config with default logging settings.
    pub fn new(learning_rate: f64, iterations: usize) -> Self {
        Self {
            learning_rate,
            iterations,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.log_interval == 0 {
            return Err(ConfigError::InvalidLogInterval);
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            iterations: 1000,
            log_interval: 100,
            verbosity: Verbosity::Silent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config_is_valid() {
        let config = SolverConfig::builder().build().unwrap();
        assert_eq!(config, SolverConfig::default());
        assert!((config.learning_rate - 0.01).abs() < 1e-12);
        assert_eq!(config.iterations, 1000);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.1)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_invalid_learning_rate(#[case] lr: f64) {
        let result = SolverConfig::builder().learning_rate(lr).build();
        assert!(matches!(result, Err(ConfigError::InvalidLearningRate(_))));
    }

    #[test]
    fn test_zero_iterations_is_valid() {
        let config = SolverConfig::builder().iterations(0).build().unwrap();
        assert_eq!(config.iterations, 0);
    }

    #[test]
    fn test_invalid_log_interval() {
        let result = SolverConfig::builder().log_interval(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidLogInterval)));
    }

    #[test]
    fn test_new_keeps_logging_defaults() {
        let config = SolverConfig::new(0.5, 10);
        assert_eq!(config.log_interval, 100);
        assert_eq!(config.verbosity, Verbosity::Silent);
    }
}
