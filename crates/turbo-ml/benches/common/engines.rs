use std::num::NonZeroUsize;

use turbo_ml::{Engine, EngineConfig};

/// Thread counts swept by scaling benchmarks.
pub const THREAD_COUNTS: &[usize] = &[1, 2, 4, 8];

/// Engine with a dedicated pool of `n_threads` workers.
pub fn engine_with_threads(n_threads: usize) -> Engine {
    let n_threads = NonZeroUsize::new(n_threads).expect("n_threads must be >= 1");
    let config = EngineConfig::builder()
        .n_threads(n_threads)
        .build()
        .expect("valid engine config");
    Engine::new(config).expect("failed to build engine")
}
