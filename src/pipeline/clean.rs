//! Output tree removal.
//!
//! Runs first in every full build so the output tree only ever contains
//! artifacts of the current run.

use crate::{config::ProjectConfig, log};
use anyhow::{Context, Result};
use std::fs;

pub fn run(config: &ProjectConfig) -> Result<()> {
    let output = &config.build.output;

    if output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
        log!("clean"; "removed {}", output.display());
    }

    Ok(())
}
