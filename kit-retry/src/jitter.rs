//! Random sources for backoff jitter.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform random values in `[-1, 1]`.
pub trait JitterSource: Send + Sync {
    /// Draw the next value.
    fn sample(&self) -> f64;
}

/// Draws from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen_range(-1.0..=1.0)
    }
}

/// A seeded generator, for reproducible delay sequences.
#[derive(Debug)]
pub struct SeededJitter {
    rng: Mutex<StdRng>,
}

impl SeededJitter {
    /// Create a source from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl JitterSource for SeededJitter {
    fn sample(&self) -> f64 {
        self.rng.lock().gen_range(-1.0..=1.0)
    }
}

/// Always returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(f64);

impl FixedJitter {
    /// Create a fixed source. The value is clamped into `[-1, 1]`.
    pub fn new(value: f64) -> Self {
        Self(value.clamp(-1.0, 1.0))
    }
}

impl JitterSource for FixedJitter {
    fn sample(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_rng_in_range() {
        let source = ThreadRngJitter;
        for _ in 0..1_000 {
            let v = source.sample();
            assert!((-1.0..=1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = SeededJitter::new(7);
        let b = SeededJitter::new(7);
        let xs: Vec<f64> = (0..16).map(|_| a.sample()).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.sample()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_fixed_clamps() {
        assert_eq!(FixedJitter::new(3.0).sample(), 1.0);
        assert_eq!(FixedJitter::new(-0.25).sample(), -0.25);
    }
}
