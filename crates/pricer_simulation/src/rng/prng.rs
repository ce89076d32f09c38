//! Seeded pseudo-random number generator.
//!
//! [`PricerRng`] wraps `StdRng` so that every sample of a simulation can be
//! regenerated from `(seed, sample)` alone, independent of which worker
//! thread runs it.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// Reproducible normal variate generator.
///
/// # Examples
///
/// ```
/// use pricer_simulation::rng::PricerRng;
///
/// let mut a = PricerRng::for_sample(42, 7);
/// let mut b = PricerRng::for_sample(42, 7);
/// assert_eq!(a.gen_normal(), b.gen_normal());
/// ```
pub struct PricerRng {
    inner: StdRng,
    seed: u64,
}

impl PricerRng {
    /// Creates a generator from a seed.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Generator dedicated to one Monte Carlo sample.
    #[inline]
    pub fn for_sample(seed: u64, sample: usize) -> Self {
        Self::from_seed(seed.wrapping_add(sample as u64))
    }

    /// Seed the generator was created with.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// One standard normal variate.
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Fills `buffer` with standard normal variates.
    #[inline]
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_differ() {
        let mut a = PricerRng::for_sample(1, 0);
        let mut b = PricerRng::for_sample(1, 1);
        let mut xa = [0.0; 8];
        let mut xb = [0.0; 8];
        a.fill_normal(&mut xa);
        b.fill_normal(&mut xb);
        assert_ne!(xa, xb);
        assert_eq!(b.seed(), 2);
    }

    #[test]
    fn test_normal_moments() {
        let mut rng = PricerRng::from_seed(2024);
        let n = 50_000;
        let draws: Vec<f64> = (0..n).map(|_| rng.gen_normal()).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        assert!(mean.abs() < 0.02, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.03, "variance {}", var);
    }
}
