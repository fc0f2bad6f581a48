use std::time::Duration;

use criterion::measurement::WallTime;
use criterion::{BenchmarkGroup, Criterion, SamplingMode, Throughput};

/// Criterion settings for whole-kernel and whole-fit runs.
///
/// A single-thread 500x500 matmul or 1M x 50 trig pass takes hundreds of
/// milliseconds to seconds, so samples stay at Criterion's minimum and the
/// measurement window is sized for ten of the slowest runs.
pub fn kernel_criterion() -> Criterion {
    Criterion::default()
        // Allows `--bench` command-line overrides.
        .configure_from_args()
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(30))
        .sample_size(10)
        .noise_threshold(0.03)
}

/// Open a flat-sampled group reporting `elements` processed per iteration.
///
/// Every sample runs the same iteration count, which suits calls far longer
/// than the timer resolution.
pub fn kernel_group<'a>(
    c: &'a mut Criterion,
    name: &str,
    elements: u64,
) -> BenchmarkGroup<'a, WallTime> {
    let mut group = c.benchmark_group(name);
    group.sampling_mode(SamplingMode::Flat);
    group.throughput(Throughput::Elements(elements));
    group
}
