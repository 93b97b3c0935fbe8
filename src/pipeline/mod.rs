//! Pipeline tasks and the step sequencer.
//!
//! Every transformation is a [`Task`]: a named, stateless, idempotent unit
//! mapping source paths to output paths. Tasks are wired into a declared
//! list of [`Step`]s; a step is either one task or a parallel group of
//! tasks with disjoint output paths.
//!
//! ```text
//! Clean → Vendor → Styles → Markup → Scripts → Images → Webp → Sprite
//!                                                                 │
//!                                              ┌──────────────────┘
//!                                              ▼
//!                                   ╔═══ parallel ═══╗
//!                                   ║ FontsWoff2     ║
//!                                   ║ FontsWoff      ║
//!                                   ╚════════════════╝
//! ```
//!
//! The first failing task aborts the remaining sequence.

pub mod clean;
pub mod fonts;
pub mod images;
pub mod lint;
pub mod markup;
pub mod scripts;
pub mod sprite;
pub mod styles;
pub mod vendor;
pub mod webp;

use crate::config::ProjectConfig;
use anyhow::{Context, Result};
use rayon::prelude::*;

/// A single pipeline task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Clean,
    Vendor,
    Styles,
    Markup,
    Scripts,
    Images,
    Webp,
    Sprite,
    FontsWoff,
    FontsWoff2,
    Lint,
}

impl Task {
    /// Task name used for logging and error context.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Vendor => "vendor",
            Self::Styles => "styles",
            Self::Markup => "markup",
            Self::Scripts => "scripts",
            Self::Images => "images",
            Self::Webp => "webp",
            Self::Sprite => "sprite",
            Self::FontsWoff => "woff",
            Self::FontsWoff2 => "woff2",
            Self::Lint => "lint",
        }
    }

    /// Run the task against the configured trees.
    pub fn run(self, config: &ProjectConfig) -> Result<()> {
        match self {
            Self::Clean => clean::run(config),
            Self::Vendor => vendor::run(config),
            Self::Styles => styles::run(config),
            Self::Markup => markup::run(config),
            Self::Scripts => scripts::run(config),
            Self::Images => images::run(config),
            Self::Webp => webp::run(config),
            Self::Sprite => sprite::run(config),
            Self::FontsWoff => fonts::run_woff(config),
            Self::FontsWoff2 => fonts::run_woff2(config),
            Self::Lint => lint::run(config),
        }
    }
}

/// One entry in a declared task sequence.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Run a single task.
    Task(Task),
    /// Run a group of tasks concurrently. Members must write disjoint
    /// output paths; no ordering is guaranteed between them.
    Parallel(&'static [Task]),
}

/// The full build sequence.
pub const BUILD_SEQUENCE: &[Step] = &[
    Step::Task(Task::Clean),
    Step::Task(Task::Vendor),
    Step::Task(Task::Styles),
    Step::Task(Task::Markup),
    Step::Task(Task::Scripts),
    Step::Task(Task::Images),
    Step::Task(Task::Webp),
    Step::Task(Task::Sprite),
    Step::Parallel(&[Task::FontsWoff2, Task::FontsWoff]),
];

/// Execute a sequence of steps in order, aborting on the first failure.
pub fn run_steps(steps: &[Step], config: &ProjectConfig) -> Result<()> {
    run_steps_with(steps, |task| {
        task.run(config)
            .with_context(|| format!("task `{}` failed", task.name()))
    })
}

/// Sequencer core, generic over the task runner so the ordering and abort
/// contract is testable without touching the filesystem.
fn run_steps_with(steps: &[Step], runner: impl Fn(Task) -> Result<()> + Sync) -> Result<()> {
    for step in steps {
        match step {
            Step::Task(task) => runner(*task)?,
            Step::Parallel(tasks) => {
                let results: Vec<Result<()>> = tasks.par_iter().map(|t| runner(*t)).collect();
                for result in results {
                    result?;
                }
            }
        }
    }
    Ok(())
}
