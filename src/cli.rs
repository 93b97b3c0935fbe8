//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Atelier asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: atelier.toml)
    #[arg(short = 'C', long, default_value = "atelier.toml")]
    pub config: PathBuf,

    /// subcommands (defaults to `start` when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Deletes the output directory and runs the full build sequence
    Build,

    /// Full build, then dev server with file watching and live reload
    Start {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port to serve on (reload websocket takes port + 1)
        #[arg(short, long)]
        port: Option<u16>,

        /// enable watch
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// Lint script sources; non-zero exit on violations
    Test,
}

impl Cli {
    /// Resolve the effective command: bare `atelier` means `start`.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start {
            interface: None,
            port: None,
            watch: None,
        })
    }

    pub const fn is_build(&self) -> bool {
        matches!(self.command, Some(Commands::Build))
    }

    pub const fn is_test(&self) -> bool {
        matches!(self.command, Some(Commands::Test))
    }
}
