//! Sample-config command implementation

use crate::config::SAMPLE_CONFIG;
use crate::error::Result;
use std::path::Path;
use tracing::info;

/// Writes the example configuration to `output`, or stdout when absent.
pub fn run(output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, SAMPLE_CONFIG)?;
            info!(path = %path.display(), "Sample configuration written");
        }
        None => print!("{}", SAMPLE_CONFIG),
    }
    Ok(())
}
