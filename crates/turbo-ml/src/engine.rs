//! Executor-owning facade over the kernels and the solver.

use crate::config::EngineConfig;
use crate::data::DenseBuffer;
use crate::error::Result;
use crate::kernels::{self, ElementTransform, TrigChain};
use crate::logger::Verbosity;
use crate::parallel::Executor;
use crate::solver::{Solver, SolverConfig};

/// Entry point for every numeric operation.
///
/// An engine owns an [`Executor`] (global rayon pool, or a dedicated pool
/// when `n_threads` is configured) and the matmul block size. Engines are
/// cheap to clone; clones share the same pool.
///
/// # Example
///
/// ```
/// use turbo_ml::{DenseBuffer, Engine, EngineConfig};
///
/// let engine = Engine::new(EngineConfig::builder().block_size(32).build().unwrap()).unwrap();
/// let a = DenseBuffer::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
/// let c = engine.matmul(&a, &a).unwrap();
/// assert_eq!(c.to_vec(), vec![7.0, 10.0, 15.0, 22.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    executor: Executor,
    block_size: usize,
    verbosity: Verbosity,
}

impl Default for Engine {
    /// Engine on the global pool with default settings.
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            executor: Executor::global(),
            block_size: config.block_size,
            verbosity: config.verbosity,
        }
    }
}

impl Engine {
    /// Create an engine from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`](crate::EngineError::Config) for an
    /// invalid configuration and
    /// [`EngineError::ThreadPool`](crate::EngineError::ThreadPool) if the
    /// dedicated pool cannot be built.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let executor = Executor::from_config(&config)?;
        if config.verbosity.allows(Verbosity::Info) {
            tracing::info!(
                workers = executor.n_workers(),
                dedicated_pool = config.n_threads.is_some(),
                block_size = config.block_size,
                min_parallel_work = config.min_parallel_work,
                "engine ready"
            );
        }
        Ok(Self {
            executor,
            block_size: config.block_size,
            verbosity: config.verbosity,
        })
    }

    #[inline]
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn n_workers(&self) -> usize {
        self.executor.n_workers()
    }

    // =========================================================================
    // Kernels
    // =========================================================================

    /// `a · b`. See [`kernels::matmul`].
    pub fn matmul(&self, a: &DenseBuffer, b: &DenseBuffer) -> Result<DenseBuffer> {
        kernels::matmul(&self.executor, a, b, self.block_size)
    }

    /// Square product of two flat row-major `n x n` matrices.
    pub fn matrix_multiply(&self, a: Vec<f64>, b: Vec<f64>, n: usize) -> Result<Vec<f64>> {
        kernels::matrix_multiply(&self.executor, a, b, n, self.block_size)
    }

    /// Sum of [`TrigChain`] applied `repeat` times to each value.
    pub fn heavy_transform(&self, values: &[f64], repeat: usize) -> Result<f64> {
        self.transform_sum(&TrigChain, values, repeat)
    }

    /// [`TrigChain`] applied `repeat` times to each value, as an `n x 1` buffer.
    pub fn heavy_map(&self, values: &[f64], repeat: usize) -> Result<DenseBuffer> {
        self.transform_map(&TrigChain, values, repeat)
    }

    /// Like [`heavy_transform`](Self::heavy_transform) with a caller-chosen transform.
    pub fn transform_sum<T>(&self, transform: &T, values: &[f64], repeat: usize) -> Result<f64>
    where
        T: ElementTransform + ?Sized,
    {
        kernels::transform_sum(&self.executor, transform, values, repeat)
    }

    /// Like [`heavy_map`](Self::heavy_map) with a caller-chosen transform.
    pub fn transform_map<T>(
        &self,
        transform: &T,
        values: &[f64],
        repeat: usize,
    ) -> Result<DenseBuffer>
    where
        T: ElementTransform + ?Sized,
    {
        kernels::transform_map(&self.executor, transform, values, repeat)
    }

    pub fn transpose(&self, x: &DenseBuffer) -> Result<DenseBuffer> {
        kernels::transpose(&self.executor, x)
    }

    pub fn add_scalar(&self, x: &DenseBuffer, value: f64) -> Result<DenseBuffer> {
        kernels::add_scalar(&self.executor, x, value)
    }

    pub fn mul_scalar(&self, x: &DenseBuffer, value: f64) -> Result<DenseBuffer> {
        kernels::mul_scalar(&self.executor, x, value)
    }

    // =========================================================================
    // Solver
    // =========================================================================

    /// Unfitted solver dispatching on this engine's pool.
    pub fn solver(&self, learning_rate: f64, iterations: usize) -> Solver {
        Solver::new(learning_rate, iterations).with_executor(self.executor.clone())
    }

    /// Unfitted solver from a configuration, dispatching on this engine's pool.
    pub fn solver_from_config(&self, config: SolverConfig) -> Solver {
        Solver::from_config(config).with_executor(self.executor.clone())
    }
}
