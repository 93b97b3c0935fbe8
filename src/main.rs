//! Atelier - a build pipeline and dev server for hand-rolled static sites.

mod build;
mod cli;
mod config;
mod logger;
mod pipeline;
mod reload;
mod serve;
mod utils;
mod watch;

use anyhow::Result;
use build::run_build;
use clap::Parser;
use cli::{Cli, Commands};
use config::ProjectConfig;
use pipeline::Task;
use serve::serve_site;
use std::path::Path;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static ProjectConfig = Box::leak(Box::new(load_config(cli)?));

    match cli.command() {
        Commands::Build => run_build(config),
        Commands::Test => Task::Lint.run(config),
        Commands::Start { .. } => {
            run_build(config)?;
            serve_site(config)
        }
    }
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file is not an error; the defaults describe the
/// conventional project layout.
fn load_config(cli: &'static Cli) -> Result<ProjectConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        ProjectConfig::from_path(&config_path)?
    } else {
        ProjectConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}
