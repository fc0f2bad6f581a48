//! Chunked dispatch over a bounded worker pool.

use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::{DEFAULT_MIN_PARALLEL_WORK, EngineConfig};
use crate::error::{EngineError, Result};
use crate::logger::Verbosity;
use crate::utils::Parallelism;

use super::WorkPartition;

/// Dedicated pools get at most this many threads per hardware thread.
pub const MAX_THREADS_PER_CORE: usize = 4;

/// Largest dedicated pool the executor will build on this machine.
pub fn max_workers() -> usize {
    let hardware = std::thread::available_parallelism().map_or(1, |n| n.get());
    hardware.saturating_mul(MAX_THREADS_PER_CORE)
}

/// Runs independent units of work over disjoint chunks and joins them.
///
/// An executor either borrows the global rayon pool or owns a dedicated one.
/// Each call partitions its index space into at most `n_workers()` chunks,
/// unless its work estimate is below the sequential floor, in which case the
/// whole space is a single chunk run on the calling thread.
///
/// Units are isolated from each other: a panicking unit is caught, the other
/// units still run to completion, and the call then reports
/// [`EngineError::ComputeFailure`]. Calls are blocking and cannot be
/// cancelled once dispatched.
#[derive(Debug, Clone)]
pub struct Executor {
    pool: Option<Arc<ThreadPool>>,
    min_parallel_work: usize,
    verbosity: Verbosity,
    /// Operation whose units panic on purpose.
    #[cfg(test)]
    fail_on: Option<&'static str>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::global()
    }
}

impl Executor {
    /// Executor on the global rayon pool with default settings.
    pub fn global() -> Self {
        Self {
            pool: None,
            min_parallel_work: DEFAULT_MIN_PARALLEL_WORK,
            verbosity: Verbosity::Silent,
            #[cfg(test)]
            fail_on: None,
        }
    }

    /// Build an executor from an engine configuration.
    ///
    /// A dedicated pool is created only when `n_threads` is set. Requests
    /// above [`max_workers`] are clamped to it.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let pool = match config.n_threads {
            Some(n) => Some(Arc::new(Self::build_pool(n.get(), config.verbosity)?)),
            None => None,
        };
        Ok(Self {
            pool,
            min_parallel_work: config.min_parallel_work,
            verbosity: config.verbosity,
            #[cfg(test)]
            fail_on: None,
        })
    }

    fn build_pool(requested: usize, verbosity: Verbosity) -> Result<ThreadPool> {
        let limit = max_workers();
        let n_threads = requested.min(limit);
        if n_threads < requested && verbosity.allows(Verbosity::Warning) {
            tracing::warn!(
                requested,
                limit,
                n_threads,
                "requested thread count exceeds hardware; clamping"
            );
        }
        ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("turbo-ml-{i}"))
            .build()
            .map_err(|e| EngineError::ThreadPool(e.to_string()))
    }

    /// Override the sequential floor.
    pub fn with_min_parallel_work(mut self, min_parallel_work: usize) -> Self {
        self.min_parallel_work = min_parallel_work;
        self
    }

    #[inline]
    pub fn min_parallel_work(&self) -> usize {
        self.min_parallel_work
    }

    /// Number of workers available to this executor.
    pub fn n_workers(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Partition `[0, n)` for a call with the given work estimate.
    pub fn partition(&self, n: usize, work: usize) -> WorkPartition {
        let workers = self.n_workers();
        match Parallelism::for_work(work, self.min_parallel_work, workers) {
            Parallelism::Sequential => WorkPartition::single(n),
            Parallelism::Parallel => WorkPartition::new(n, workers),
        }
    }

    /// Run `f` inside this executor's pool.
    pub fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    /// Fill `output` band by band.
    ///
    /// `output` is viewed as rows of `row_len` elements. Each unit receives
    /// the row range it owns and the mutable slice holding exactly those
    /// rows; no two units ever see overlapping slices.
    pub fn for_each_chunk<F>(
        &self,
        op: &'static str,
        output: &mut [f64],
        row_len: usize,
        work: usize,
        f: F,
    ) -> Result<()>
    where
        F: Fn(Range<usize>, &mut [f64]) + Sync,
    {
        if row_len == 0 || output.is_empty() {
            return Ok(());
        }
        debug_assert_eq!(output.len() % row_len, 0);

        let n_rows = output.len() / row_len;
        let partition = self.partition(n_rows, work);
        self.log_dispatch(op, &partition, work);

        let mut units = Vec::with_capacity(partition.len());
        let mut rest = output;
        for range in partition.iter() {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * row_len);
            units.push((range, head));
            rest = tail;
        }

        let parallelism = Self::mode(&partition);
        let outcomes = self.install(|| {
            parallelism.maybe_par_map(units, |(range, slice)| {
                run_unit(|| {
                    self.inject_failure(op);
                    f(range, slice)
                })
            })
        });
        collect(op, outcomes).map(|_| ())
    }

    /// Evaluate `f` once per chunk of `[0, n)`.
    ///
    /// Results come back in ascending chunk order regardless of completion
    /// order, so folding them left to right gives the same answer on every
    /// run with the same worker count.
    pub fn map_chunks<T, F>(&self, op: &'static str, n: usize, work: usize, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(Range<usize>) -> T + Sync,
    {
        let partition = self.partition(n, work);
        self.log_dispatch(op, &partition, work);

        let parallelism = Self::mode(&partition);
        let outcomes = self.install(|| {
            parallelism.maybe_par_map(0..partition.len(), |i| {
                run_unit(|| {
                    self.inject_failure(op);
                    f(partition.chunk(i))
                })
            })
        });
        collect(op, outcomes)
    }

    /// Make every unit of `op` panic.
    #[cfg(test)]
    pub(crate) fn failing_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    #[cfg(test)]
    fn inject_failure(&self, op: &'static str) {
        if self.fail_on == Some(op) {
            panic!("injected failure in {op}");
        }
    }

    #[cfg(not(test))]
    #[inline(always)]
    fn inject_failure(&self, _op: &'static str) {}

    fn mode(partition: &WorkPartition) -> Parallelism {
        if partition.len() > 1 {
            Parallelism::Parallel
        } else {
            Parallelism::Sequential
        }
    }

    fn log_dispatch(&self, op: &'static str, partition: &WorkPartition, work: usize) {
        if self.verbosity.allows(Verbosity::Debug) {
            tracing::debug!(
                op,
                items = partition.total(),
                chunks = partition.len(),
                work,
                sequential = partition.len() <= 1,
                "dispatch"
            );
        }
    }
}

fn run_unit<T>(f: impl FnOnce() -> T) -> std::result::Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

fn collect<T>(op: &'static str, outcomes: Vec<std::result::Result<T, String>>) -> Result<Vec<T>> {
    let chunks = outcomes.len();
    let mut values = Vec::with_capacity(chunks);
    let mut failed = 0;
    let mut first_failure: Option<(usize, String)> = None;

    for (chunk, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(value) => values.push(value),
            Err(message) => {
                failed += 1;
                if first_failure.is_none() {
                    first_failure = Some((chunk, message));
                }
            }
        }
    }

    match first_failure {
        None => Ok(values),
        Some((first_chunk, message)) => Err(EngineError::ComputeFailure {
            op,
            failed,
            chunks,
            first_chunk,
            message,
        }),
    }
}
