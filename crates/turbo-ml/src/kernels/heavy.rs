//! Repeated per-element transforms, reduced or collected.
//!
//! The transform is a capability: anything implementing [`ElementTransform`]
//! (including plain closures) can be plugged into the same chunked dispatch.
//! [`TrigChain`] is the built-in one.

use crate::data::DenseBuffer;
use crate::error::Result;
use crate::parallel::Executor;

use super::elementwise::map_values;

/// A pure function from `f64` to `f64`.
pub trait ElementTransform: Send + Sync {
    fn apply(&self, x: f64) -> f64;

    /// Apply the transform `repeat` times in sequence.
    #[inline]
    fn apply_n(&self, x: f64, repeat: usize) -> f64 {
        let mut value = x;
        for _ in 0..repeat {
            value = self.apply(value);
        }
        value
    }
}

impl<F> ElementTransform for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    #[inline]
    fn apply(&self, x: f64) -> f64 {
        self(x)
    }
}

/// `x -> |tan(cos(sin(x)))|`.
///
/// Bounded and smooth: `sin` maps into `[-1, 1]`, `cos` of that lies in
/// `[cos 1, 1]`, well inside `tan`'s continuous range, so repeated
/// application never produces infinities for finite input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrigChain;

impl ElementTransform for TrigChain {
    #[inline]
    fn apply(&self, x: f64) -> f64 {
        x.sin().cos().tan().abs()
    }
}

/// Sum of `transform` applied `repeat` times to every value.
///
/// Each chunk sums its own elements; chunk sums are then added in ascending
/// chunk order. Empty input gives `0.0`.
pub fn transform_sum<T>(
    executor: &Executor,
    transform: &T,
    values: &[f64],
    repeat: usize,
) -> Result<f64>
where
    T: ElementTransform + ?Sized,
{
    if values.is_empty() {
        return Ok(0.0);
    }

    let work = values.len().saturating_mul(repeat.max(1));
    let partials = executor.map_chunks("heavy_transform", values.len(), work, |range| {
        values[range]
            .iter()
            .map(|&x| transform.apply_n(x, repeat))
            .sum::<f64>()
    })?;
    Ok(partials.into_iter().sum())
}

/// `transform` applied `repeat` times to every value, as an `n x 1` buffer.
pub fn transform_map<T>(
    executor: &Executor,
    transform: &T,
    values: &[f64],
    repeat: usize,
) -> Result<DenseBuffer>
where
    T: ElementTransform + ?Sized,
{
    let work = values.len().saturating_mul(repeat.max(1));
    let data = map_values(executor, "heavy_map", values, work, |x| {
        transform.apply_n(x, repeat)
    })?;
    Ok(DenseBuffer::column(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn trig_chain_matches_composition() {
        let x = 0.3_f64;
        let expected = x.sin().cos().tan().abs();
        assert_eq!(TrigChain.apply(x), expected);
        assert_eq!(TrigChain.apply_n(x, 2), TrigChain.apply(expected));
    }

    #[test]
    fn zero_repeats_is_identity() {
        assert_eq!(TrigChain.apply_n(-4.5, 0), -4.5);
    }

    #[test]
    fn trig_chain_stays_finite() {
        for &x in &[0.0, 1.0, -1.0, 1e6, -1e-9, 2.5] {
            let y = TrigChain.apply_n(x, 50);
            assert!(y.is_finite());
            assert!(y >= 0.0);
        }
    }

    #[test]
    fn closure_transforms() {
        let executor = Executor::global();
        let double = |x: f64| 2.0 * x;
        let sum = transform_sum(&executor, &double, &[1.0, 2.0, 3.0], 3).unwrap();
        assert_relative_eq!(sum, 48.0);
    }

    #[test]
    fn dyn_transform() {
        let executor = Executor::global();
        let transform: &dyn ElementTransform = &TrigChain;
        let mapped = transform_map(&executor, transform, &[0.5, 1.5], 1).unwrap();
        assert_eq!(mapped.shape(), (2, 1));
        assert_eq!(mapped.as_slice()[0], TrigChain.apply(0.5));
    }

    #[test]
    fn empty_input() {
        let executor = Executor::global();
        assert_eq!(transform_sum(&executor, &TrigChain, &[], 10).unwrap(), 0.0);
        let mapped = transform_map(&executor, &TrigChain, &[], 10).unwrap();
        assert_eq!(mapped.shape(), (0, 1));
        assert!(mapped.is_empty());
    }
}
