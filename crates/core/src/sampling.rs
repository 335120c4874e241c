//! Injectable uniform random source
//!
//! The automaton draws one sample per probabilistic check. Production code wraps
//! any `rand` generator in [`RngSource`]; tests drive the automaton through a
//! [`SequenceSource`] so every run is reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform sampler consumed by the automaton.
pub trait UniformSource {
    /// Sample in `[0, 1)`
    fn next_unit(&mut self) -> f32;

    /// Index in `0..bound`. `bound` must be non-zero.
    fn next_index(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        // next_unit < 1.0, but rounding of large bounds can still land on `bound`
        ((self.next_unit() * bound as f32) as usize).min(bound - 1)
    }
}

/// Adapter over any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RngSource<StdRng> {
    /// Non-deterministic source seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Reproducible source
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> UniformSource for RngSource<R> {
    #[inline]
    fn next_unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    #[inline]
    fn next_index(&mut self, bound: usize) -> usize {
        self.rng.random_range(0..bound)
    }
}

/// Fixed, cycling sequence of samples.
///
/// Values are clamped into `[0, 1)` on construction. An empty sequence yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceSource {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let values = values
            .into()
            .into_iter()
            .map(|v| if v.is_finite() { v.clamp(0.0, 1.0 - f32::EPSILON) } else { 0.0 })
            .collect();
        Self { values, cursor: 0 }
    }

    /// Source that always returns `value`
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Number of samples drawn so far
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl UniformSource for SequenceSource {
    fn next_unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

impl<S: UniformSource + ?Sized> UniformSource for &mut S {
    fn next_unit(&mut self) -> f32 {
        (**self).next_unit()
    }

    fn next_index(&mut self, bound: usize) -> usize {
        (**self).next_index(bound)
    }
}

impl<S: UniformSource + ?Sized> UniformSource for Box<S> {
    fn next_unit(&mut self) -> f32 {
        (**self).next_unit()
    }

    fn next_index(&mut self, bound: usize) -> usize {
        (**self).next_index(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_cycles() {
        let mut source = SequenceSource::new(vec![0.1, 0.5]);
        assert_eq!(source.next_unit(), 0.1);
        assert_eq!(source.next_unit(), 0.5);
        assert_eq!(source.next_unit(), 0.1);
        assert_eq!(source.drawn(), 3);
    }

    #[test]
    fn test_sequence_clamps_into_unit_interval() {
        let mut source = SequenceSource::new(vec![-3.0, 1.0, f32::NAN]);
        assert_eq!(source.next_unit(), 0.0);
        assert!(source.next_unit() < 1.0);
        assert_eq!(source.next_unit(), 0.0);
    }

    #[test]
    fn test_sequence_index_in_bounds() {
        let mut source = SequenceSource::new(vec![0.0, 0.5, 0.999_999]);
        assert_eq!(source.next_index(10), 0);
        assert_eq!(source.next_index(10), 5);
        assert_eq!(source.next_index(10), 9);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = RngSource::seeded(42);
        let mut b = RngSource::seeded(42);
        for _ in 0..100 {
            let sample = a.next_unit();
            assert!((0.0..1.0).contains(&sample));
            assert_eq!(sample, b.next_unit());
        }
    }
}
