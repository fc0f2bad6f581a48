//! Sequential/parallel switch used by the executor.

use rayon::prelude::*;

// =============================================================================
// Parallelism
// =============================================================================

/// Whether parallel execution is allowed for a call.
///
/// The executor decides this once per call from the worker count and the
/// call's work estimate; kernels never manage threads themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Pick a mode for a call of size `work` given the sequential floor.
    #[inline]
    pub fn for_work(work: usize, min_parallel_work: usize, n_workers: usize) -> Self {
        if n_workers <= 1 || work < min_parallel_work {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Map preserving input order in both modes.
    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, iter: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().map(f).collect()
        } else {
            iter.into_iter().map(f).collect()
        }
    }
}
