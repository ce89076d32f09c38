//! Monte Carlo simulation configuration.

use crate::error::ConfigError;

/// Maximum number of samples allowed.
pub const MAX_SAMPLES: usize = 1_000_000;

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 42;

/// Simulation parameters shared by every worker.
///
/// # Examples
///
/// ```
/// use pricer_simulation::SimulationConfig;
///
/// let config = SimulationConfig::builder()
///     .samples(1_000)
///     .seed(7)
///     .threads(4)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.samples(), 1_000);
/// assert_eq!(config.threads(), Some(4));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    samples: usize,
    seed: u64,
    threads: Option<usize>,
}

impl SimulationConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Number of Monte Carlo samples.
    #[inline]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Base seed; sample `s` draws from `seed + s`.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Worker threads, `None` for the rayon default.
    #[inline]
    pub fn threads(&self) -> Option<usize> {
        self.threads
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `samples` is 0 or greater than 1,000,000
    /// - `threads` is `Some(0)`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples == 0 || self.samples > MAX_SAMPLES {
            return Err(ConfigError::InvalidSampleCount(self.samples));
        }
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidThreadCount(0));
        }
        Ok(())
    }
}

/// Builder for [`SimulationConfig`].
#[derive(Clone, Debug, Default)]
pub struct SimulationConfigBuilder {
    samples: Option<usize>,
    seed: Option<u64>,
    threads: Option<usize>,
}

impl SimulationConfigBuilder {
    /// Sets the number of samples.
    #[inline]
    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

    /// Sets the base seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the worker thread count.
    #[inline]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingParameter` if `samples` was not set, or
    /// any error from [`SimulationConfig::validate`].
    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let config = SimulationConfig {
            samples: self.samples.ok_or(ConfigError::MissingParameter("samples"))?,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            threads: self.threads,
        };
        config.validate()?;
        Ok(config)
    }
}
