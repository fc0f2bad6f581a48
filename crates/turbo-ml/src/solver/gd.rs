//! Fixed-iteration batch gradient descent for linear regression.

use crate::data::DenseBuffer;
use crate::error::{EngineError, Result};
use crate::logger::TrainingLogger;
use crate::parallel::Executor;

use super::SolverConfig;

/// Linear regression fitted by batch gradient descent on the mean squared error.
///
/// The model is `y ≈ bias + w · x`. The feature count is fixed by the first
/// call to [`fit`](Self::fit); later fits and every [`predict`](Self::predict)
/// must use the same number of columns.
///
/// `fit` takes `&mut self` and `predict` takes `&self`, so any number of
/// predictions may run concurrently against a solver that is not fitting.
///
/// # Example
///
/// ```
/// use turbo_ml::{DenseBuffer, Solver};
///
/// let x = DenseBuffer::from_rows(vec![vec![1.0], vec![2.0], vec![3.0]]).unwrap();
/// let mut solver = Solver::new(0.1, 2_000);
/// solver.fit(&x, &[2.0, 4.0, 6.0]).unwrap();
///
/// let pred = solver.predict(&DenseBuffer::from_rows(vec![vec![4.0]]).unwrap()).unwrap();
/// assert!((pred[0] - 8.0).abs() < 0.1);
/// ```
#[derive(Debug, Clone)]
pub struct Solver {
    weights: Vec<f64>,
    bias: f64,
    n_features: Option<usize>,
    config: SolverConfig,
    executor: Executor,
}

/// Per-chunk gradient sums.
#[derive(Debug, Clone)]
struct GradientSums {
    dw: Vec<f64>,
    db: f64,
    sse: f64,
}

impl GradientSums {
    fn zeros(n_features: usize) -> Self {
        Self {
            dw: vec![0.0; n_features],
            db: 0.0,
            sse: 0.0,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (a, b) in self.dw.iter_mut().zip(&other.dw) {
            *a += b;
        }
        self.db += other.db;
        self.sse += other.sse;
        self
    }
}

#[inline]
fn predict_row(weights: &[f64], bias: f64, row: &[f64]) -> f64 {
    let mut sum = bias;
    for (w, x) in weights.iter().zip(row) {
        sum += w * x;
    }
    sum
}

impl Solver {
    /// Solver on the global pool with default logging settings.
    ///
    /// Weights and bias start at zero.
    pub fn new(learning_rate: f64, iterations: usize) -> Self {
        Self::from_config(SolverConfig::new(learning_rate, iterations))
    }

    /// Solver from a (validated) configuration, on the global pool.
    pub fn from_config(config: SolverConfig) -> Self {
        Self {
            weights: Vec::new(),
            bias: 0.0,
            n_features: None,
            config,
            executor: Executor::global(),
        }
    }

    /// Dispatch on `executor` instead of the global pool.
    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Fitted weights (empty before the first fit).
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Feature count fixed by the first fit.
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    pub fn is_fitted(&self) -> bool {
        self.n_features.is_some()
    }

    pub fn learning_rate(&self) -> f64 {
        self.config.learning_rate
    }

    pub fn iterations(&self) -> usize {
        self.config.iterations
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    // =========================================================================
    // Fitting
    // =========================================================================

    /// Fit to `x` (`n x p`) and targets `y` (length `n`).
    ///
    /// Every fit starts again from zero weights and runs exactly
    /// `iterations` passes. Each pass computes all residuals with the
    /// current parameters, reduces the mean gradient chunk by chunk in a
    /// fixed order, then updates weights and bias. With no rows the feature
    /// count is recorded and no pass runs.
    ///
    /// # Errors
    ///
    /// Returns a dimension error if `y.len() != n`, or if `p` differs from the
    /// feature count of an earlier fit. A pass that fails on a worker returns
    /// a compute failure. Nothing is modified in either case.
    pub fn fit(&mut self, x: &DenseBuffer, y: &[f64]) -> Result<()> {
        let (n_samples, n_features) = x.shape();
        if y.len() != n_samples {
            return Err(EngineError::dimension(
                "fit",
                format!("X has {} rows but y has {} values", n_samples, y.len()),
            ));
        }
        if let Some(fitted) = self.n_features {
            if fitted != n_features {
                return Err(EngineError::dimension(
                    "fit",
                    format!("X has {n_features} features, solver is fixed to {fitted}"),
                ));
            }
        }

        let iterations = self.config.iterations;
        let interval = self.config.log_interval.max(1);
        let mut logger = TrainingLogger::new(self.config.verbosity);
        logger.start_training(iterations, n_samples, n_features);

        let mut weights = vec![0.0; n_features];
        let mut bias = 0.0;
        let mut last_mse = None;

        if n_samples > 0 {
            let lr = self.config.learning_rate;
            let n = n_samples as f64;
            let work = n_samples.saturating_mul(n_features + 1);
            let mut residuals = vec![0.0; n_samples];

            for iteration in 0..iterations {
                let current = &weights;
                self.executor
                    .for_each_chunk("fit/residuals", &mut residuals, 1, work, |rows, band| {
                        for (residual, i) in band.iter_mut().zip(rows) {
                            *residual = predict_row(current, bias, x.row(i)) - y[i];
                        }
                    })?;

                let residuals = &residuals;
                let partials = self.executor.map_chunks("fit/gradient", n_samples, work, |rows| {
                    let mut sums = GradientSums::zeros(n_features);
                    for i in rows {
                        let error = residuals[i];
                        for (g, &value) in sums.dw.iter_mut().zip(x.row(i)) {
                            *g += error * value;
                        }
                        sums.db += error;
                        sums.sse += error * error;
                    }
                    sums
                })?;
                let total = partials
                    .into_iter()
                    .fold(GradientSums::zeros(n_features), GradientSums::merge);

                for (w, dw) in weights.iter_mut().zip(&total.dw) {
                    *w -= lr * (dw / n);
                }
                bias -= lr * (total.db / n);

                let mse = total.sse / n;
                logger.log_iteration(iteration, interval, mse);
                last_mse = Some(mse);
            }
        }

        // Parameters are only replaced once every pass has succeeded.
        self.n_features = Some(n_features);
        self.weights = weights;
        self.bias = bias;

        logger.finish_training(last_mse);
        Ok(())
    }

    /// Fit from a flat row-major buffer of `rows x cols` values.
    pub fn fit_flat(
        &mut self,
        values: Vec<f64>,
        rows: usize,
        cols: usize,
        y: &[f64],
    ) -> Result<()> {
        let x = DenseBuffer::new(values, rows, cols)?;
        self.fit(&x, y)
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Predict one value per row of `x`.
    ///
    /// # Errors
    ///
    /// Returns a dimension error if the solver has not been fitted or if
    /// `x` has a different number of columns than the fitted feature count.
    pub fn predict(&self, x: &DenseBuffer) -> Result<Vec<f64>> {
        let n_features = self.n_features.ok_or_else(|| {
            EngineError::dimension("predict", "solver has not been fitted; feature count unknown")
        })?;
        if x.n_cols() != n_features {
            return Err(EngineError::dimension(
                "predict",
                format!("X has {} features, solver was fitted with {}", x.n_cols(), n_features),
            ));
        }

        let mut output = vec![0.0; x.n_rows()];
        let work = x.n_rows().saturating_mul(n_features + 1);
        self.executor
            .for_each_chunk("predict", &mut output, 1, work, |rows, band| {
                for (out, i) in band.iter_mut().zip(rows) {
                    *out = predict_row(&self.weights, self.bias, x.row(i));
                }
            })?;
        Ok(output)
    }

    /// Predict from a flat row-major buffer of `rows x cols` values.
    pub fn predict_flat(&self, values: Vec<f64>, rows: usize, cols: usize) -> Result<Vec<f64>> {
        let x = DenseBuffer::new(values, rows, cols)?;
        self.predict(&x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use approx::assert_abs_diff_eq;
    use std::num::NonZeroUsize;

    fn line() -> (DenseBuffer, Vec<f64>) {
        let x = DenseBuffer::from_rows(vec![vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        (x, vec![2.0, 4.0, 6.0])
    }

    #[test]
    fn new_solver_is_unfitted() {
        let solver = Solver::new(0.1, 10);
        assert!(!solver.is_fitted());
        assert!(solver.weights().is_empty());
        assert_eq!(solver.bias(), 0.0);
        assert_eq!(solver.learning_rate(), 0.1);
        assert_eq!(solver.iterations(), 10);
    }

    #[test]
    fn fits_a_line() {
        let (x, y) = line();
        let mut solver = Solver::new(0.1, 2000);
        solver.fit(&x, &y).unwrap();
        assert_abs_diff_eq!(solver.weights()[0], 2.0, epsilon = 0.05);
        assert_abs_diff_eq!(solver.bias(), 0.0, epsilon = 0.05);
    }

    #[test]
    fn single_pass_matches_hand_computation() {
        // Zero start: residuals = -y, dw = -mean(x*y) = -28/3, db = -4.
        let (x, y) = line();
        let mut solver = Solver::new(0.1, 1);
        solver.fit(&x, &y).unwrap();
        assert_abs_diff_eq!(solver.weights()[0], 0.1 * 28.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(solver.bias(), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn zero_iterations_leaves_zero_model() {
        let (x, y) = line();
        let mut solver = Solver::new(0.1, 0);
        solver.fit(&x, &y).unwrap();
        assert_eq!(solver.weights(), &[0.0]);
        assert_eq!(solver.predict(&x).unwrap(), vec![0.0; 3]);
    }

    #[test]
    fn refit_restarts_from_zero() {
        let (x, y) = line();
        let mut solver = Solver::new(0.1, 5);
        solver.fit(&x, &y).unwrap();
        let first = (solver.weights().to_vec(), solver.bias());
        solver.fit(&x, &y).unwrap();
        assert_eq!((solver.weights().to_vec(), solver.bias()), first);
    }

    #[test]
    fn target_length_mismatch() {
        let (x, _) = line();
        let mut solver = Solver::new(0.1, 5);
        let err = solver.fit(&x, &[1.0, 2.0]).unwrap_err();
        assert!(err.is_dimension());
        assert!(!solver.is_fitted());
    }

    #[test]
    fn feature_count_is_fixed_by_first_fit() {
        let (x, y) = line();
        let mut solver = Solver::new(0.1, 5);
        solver.fit(&x, &y).unwrap();
        let before = solver.weights().to_vec();

        let wide = DenseBuffer::new(vec![1.0; 6], 3, 2).unwrap();
        let err = solver.fit(&wide, &y).unwrap_err();
        assert!(err.is_dimension());
        assert_eq!(solver.weights(), before.as_slice());
    }

    #[test]
    fn failed_fit_keeps_previous_model() {
        let (x, y) = line();
        let mut solver = Solver::new(0.1, 50);
        solver.fit(&x, &y).unwrap();
        let before = (solver.weights().to_vec(), solver.bias());

        for op in ["fit/residuals", "fit/gradient"] {
            let mut failing = solver.clone();
            failing.executor = failing.executor.clone().failing_on(op);
            let err = failing.fit(&x, &y).unwrap_err();
            assert!(err.is_compute_failure(), "{op}: {err}");
            assert_eq!((failing.weights().to_vec(), failing.bias()), before);
            assert_eq!(failing.n_features(), Some(1));
        }
    }

    #[test]
    fn failed_first_fit_leaves_solver_unfitted() {
        let (x, y) = line();
        let mut solver =
            Solver::new(0.1, 5).with_executor(Executor::global().failing_on("fit/gradient"));
        assert!(solver.fit(&x, &y).unwrap_err().is_compute_failure());
        assert!(!solver.is_fitted());
        assert!(solver.weights().is_empty());
        assert!(solver.predict(&x).unwrap_err().is_dimension());
    }

    #[test]
    fn predict_before_fit_fails() {
        let solver = Solver::new(0.1, 5);
        let (x, _) = line();
        assert!(solver.predict(&x).unwrap_err().is_dimension());
    }

    #[test]
    fn empty_fit_records_features() {
        let x = DenseBuffer::new(vec![], 0, 3).unwrap();
        let mut solver = Solver::new(0.1, 100);
        solver.fit(&x, &[]).unwrap();
        assert_eq!(solver.n_features(), Some(3));
        assert_eq!(solver.weights(), &[0.0, 0.0, 0.0]);
        assert!(solver.predict(&x).unwrap().is_empty());
    }

    #[test]
    fn flat_entry_points() {
        let mut solver = Solver::new(0.1, 2000);
        solver.fit_flat(vec![1.0, 2.0, 3.0], 3, 1, &[2.0, 4.0, 6.0]).unwrap();
        let pred = solver.predict_flat(vec![4.0, 5.0], 2, 1).unwrap();
        assert_abs_diff_eq!(pred[0], 8.0, epsilon = 0.1);
        assert_abs_diff_eq!(pred[1], 10.0, epsilon = 0.1);

        assert!(solver.predict_flat(vec![1.0; 3], 2, 1).unwrap_err().is_dimension());
    }

    #[test]
    fn parallel_and_sequential_fits_agree() {
        let x = crate::testing::random_buffer(500, 4, 7, -1.0, 1.0);
        let (y, _, _) = crate::testing::linear_targets(&x, 8, 0.01);

        let mut sequential = Solver::new(0.2, 200);
        sequential.fit(&x, &y).unwrap();

        let config = EngineConfig::builder()
            .n_threads(NonZeroUsize::new(4).unwrap())
            .min_parallel_work(0)
            .build()
            .unwrap();
        let executor = Executor::from_config(&config).unwrap();
        let mut parallel = Solver::new(0.2, 200).with_executor(executor);
        parallel.fit(&x, &y).unwrap();

        for (a, b) in sequential.weights().iter().zip(parallel.weights()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(sequential.bias(), parallel.bias(), epsilon = 1e-9);
    }
}
