//! Verbosity-gated training logs.
//!
//! Events go through `tracing`, so they reach whatever subscriber the host
//! process installed. [`Verbosity`] gates them at the source: a `Silent`
//! solver emits nothing even when a subscriber is listening.

use std::time::Instant;

/// How much a component reports while it runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Only warnings (e.g. non-finite loss).
    Warning,
    /// Progress at the configured interval plus a summary.
    Info,
    /// Every iteration and every dispatch decision.
    Debug,
}

impl Verbosity {
    /// Returns `true` if messages at `level` should be emitted.
    #[inline]
    pub fn allows(self, level: Verbosity) -> bool {
        level != Verbosity::Silent && self >= level
    }
}

/// Progress logger for iterative fitting.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    started: Option<Instant>,
    n_iterations: usize,
    warned_non_finite: bool,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            started: None,
            n_iterations: 0,
            warned_non_finite: false,
        }
    }

    #[inline]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Record the start of a fit.
    pub fn start_training(&mut self, n_iterations: usize, n_samples: usize, n_features: usize) {
        self.started = Some(Instant::now());
        self.n_iterations = n_iterations;
        self.warned_non_finite = false;
        if self.verbosity.allows(Verbosity::Info) {
            tracing::info!(
                iterations = n_iterations,
                samples = n_samples,
                features = n_features,
                "starting gradient descent"
            );
        }
    }

    /// Log the mean squared error observed during `iteration`.
    ///
    /// Emitted at `Info` every `interval` iterations (and on the last one),
    /// at `Debug` on every iteration.
    pub fn log_iteration(&mut self, iteration: usize, interval: usize, mse: f64) {
        if !mse.is_finite() && !self.warned_non_finite {
            self.warned_non_finite = true;
            if self.verbosity.allows(Verbosity::Warning) {
                tracing::warn!(
                    iteration,
                    mse,
                    "loss is no longer finite; learning rate may be too large"
                );
            }
        }

        let last = iteration + 1 == self.n_iterations;
        if self.verbosity.allows(Verbosity::Debug)
            || (self.verbosity.allows(Verbosity::Info) && (iteration % interval == 0 || last))
        {
            tracing::info!(iteration, mse, "gradient descent progress");
        }
    }

    /// Record the end of a fit.
    pub fn finish_training(&mut self, final_mse: Option<f64>) {
        let elapsed = self.started.take().map(|t| t.elapsed());
        if self.verbosity.allows(Verbosity::Info) {
            tracing::info!(
                iterations = self.n_iterations,
                final_mse = final_mse.unwrap_or(f64::NAN),
                elapsed_ms = elapsed.map_or(0.0, |d| d.as_secs_f64() * 1e3),
                "finished gradient descent"
            );
        }
    }
}
