//! Full build orchestration.
//!
//! Runs the declared pipeline sequence against a fresh output tree and
//! reports wall-clock time. Individual task behavior lives in the
//! `pipeline` modules; this is just the driver.

use crate::{
    config::ProjectConfig,
    log,
    pipeline::{BUILD_SEQUENCE, run_steps},
};
use anyhow::Result;
use std::time::Instant;

/// Run every build task in declared order. The first failure aborts the
/// remaining sequence and leaves the partial output in place for
/// inspection.
pub fn run_build(config: &ProjectConfig) -> Result<()> {
    log!("build"; "building {}", config.build.source.display());
    let started = Instant::now();

    run_steps(BUILD_SEQUENCE, config)?;

    log!("build"; "done in {:.2?}", started.elapsed());
    Ok(())
}
