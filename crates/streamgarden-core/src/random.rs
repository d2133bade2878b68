//! Injectable randomness.
//!
//! Flower species, sub-variants, placement and bunny appetite are all
//! random. The engine draws through [`RandomSource`] so production can use
//! an OS-seeded generator while tests script the exact sequence of draws.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// A source of uniform random draws.
pub trait RandomSource {
    /// Uniform integer in `[0, bound)`. Returns 0 when `bound` is 0.
    fn roll(&mut self, bound: u32) -> u32;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;
}

/// Adapter that draws from any [`rand`] generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: RngCore> RngSource<R> {
    /// Wrap an existing generator.
    pub const fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<StdRng> {
    /// A generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// A reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> RandomSource for RngSource<R> {
    fn roll(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.0.random_range(0..bound)
    }

    fn unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Replays a fixed list of unit draws, then returns 0.0 forever.
///
/// `roll(bound)` maps the next value `v` to `floor(v * bound)`, so a test
/// that wants roll 37 of 100 scripts `0.37`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: VecDeque<f64>,
}

impl ScriptedRandom {
    /// Script the given draws, in order.
    pub fn new(values: &[f64]) -> Self {
        Self {
            values: values.iter().map(|v| v.clamp(0.0, 1.0)).collect(),
        }
    }

    /// Draws not yet consumed.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn roll(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        let value = self.unit();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = (value * f64::from(bound)).floor() as u32;
        scaled.min(bound.saturating_sub(1))
    }

    fn unit(&mut self) -> f64 {
        self.values.pop_front().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_roll_scales_and_clamps() {
        let mut rng = ScriptedRandom::new(&[0.37, 0.999_999, 1.0, 0.0]);
        assert_eq!(rng.roll(100), 37);
        assert_eq!(rng.roll(100), 99);
        assert_eq!(rng.roll(2), 1);
        assert_eq!(rng.roll(5), 0);
        assert_eq!(rng.remaining(), 0);
        assert_eq!(rng.roll(5), 0);
    }

    #[test]
    fn roll_of_zero_consumes_nothing() {
        let mut rng = ScriptedRandom::new(&[0.5]);
        assert_eq!(rng.roll(0), 0);
        assert_eq!(rng.remaining(), 1);
    }

    #[test]
    fn rng_source_stays_in_range() {
        let mut rng = RngSource::seeded(7);
        for _ in 0..1_000 {
            assert!(rng.roll(6) < 6);
            let unit = rng.unit();
            assert!((0.0..1.0).contains(&unit));
        }
        assert_eq!(rng.roll(0), 0);
    }

    #[test]
    fn seeded_sources_repeat() {
        let mut a = RngSource::seeded(42);
        let mut b = RngSource::seeded(42);
        let first: Vec<u32> = (0..10).map(|_| a.roll(100)).collect();
        let second: Vec<u32> = (0..10).map(|_| b.roll(100)).collect();
        assert_eq!(first, second);
    }
}
