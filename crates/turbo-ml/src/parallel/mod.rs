//! Parallel dispatch machinery shared by every kernel.
//!
//! - [`WorkPartition`]: deterministic split of `[0, n)` into contiguous chunks
//! - [`Executor`]: runs one unit per chunk on a bounded pool and joins

mod executor;
mod partition;

pub use executor::{Executor, MAX_THREADS_PER_CORE, max_workers};
pub use partition::WorkPartition;
