//! Check command implementation
//!
//! Validates a configuration and builds every engine input without running
//! the simulation.

use super::{load_config, Overrides};
use crate::error::Result;
use crate::setup::RunSetup;
use std::path::Path;
use tracing::info;

/// Run the check command
pub fn run(config_path: &Path, overrides: &Overrides) -> Result<()> {
    let config = load_config(config_path, overrides)?;
    let setup = RunSetup::build(&config)?;

    info!(
        asof = %setup.asof,
        trades = setup.portfolio.size(),
        netting_sets = setup.portfolio.netting_sets().len(),
        dates = setup.grid.len(),
        close_out = setup.grid.has_close_out(),
        samples = setup.engine.simulation().samples(),
        "Configuration OK"
    );
    println!(
        "{}: {} trades in {} netting sets, {} dates, {} samples",
        config_path.display(),
        setup.portfolio.size(),
        setup.portfolio.netting_sets().len(),
        setup.grid.len(),
        setup.engine.simulation().samples()
    );
    Ok(())
}
