//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod check;
pub mod run;
pub mod sample_config;

use crate::config::RunConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Command-line overrides applied on top of the file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Sample count.
    pub samples: Option<usize>,
    /// Output directory.
    pub output_dir: Option<PathBuf>,
}

/// Loads the configuration, applies environment then command-line
/// overrides, and validates the result.
pub fn load_config(path: &Path, overrides: &Overrides) -> Result<RunConfig> {
    let mut config = RunConfig::load(path)?.with_env_override();
    if let Some(samples) = overrides.samples {
        config.simulation.samples = samples;
    }
    if let Some(dir) = &overrides.output_dir {
        config.output_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}
