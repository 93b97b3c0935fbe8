//! Project configuration management for `atelier.toml`.
//!
//! # Sections
//!
//! | Section   | Purpose                                         |
//! |-----------|-------------------------------------------------|
//! | `[build]` | Source/output trees and per-task settings       |
//! | `[serve]` | Development server (port, interface, watch)     |
//! | `[lint]`  | Script linter exclusions                        |
//!
//! The config file is optional: the original pipeline ran with hard-coded
//! paths, so every field has a default and a missing file means defaults.
//!
//! # Example
//!
//! ```toml
//! [build]
//! source = "source"
//! output = "build"
//! jpeg_quality = 80
//!
//! [serve]
//! port = 3000
//! ```

mod build;
pub mod defaults;
mod error;
mod lint;
mod serve;

use build::BuildConfig;
use error::ConfigError;
use lint::LintConfig;
use serve::ServeConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing atelier.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Parsed CLI arguments, leaked for the process lifetime.
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Where the config was loaded from, absolute once the CLI is folded in.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Pipeline trees and per-task knobs
    pub build: BuildConfig,

    /// Dev server settings
    pub serve: ServeConfig,

    /// Linter exclusions
    pub lint: LintConfig,
}

impl ProjectConfig {
    /// Parse a TOML document into a config.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: ProjectConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Read and parse `atelier.toml` from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Read(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Project root, `./` until the CLI pins it.
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf());
    }

    /// Absolute path of the entry stylesheet.
    pub fn style_entry(&self) -> PathBuf {
        self.build.source.join(&self.build.style_entry)
    }

    /// Absolute path of the TrueType font directory.
    pub fn fonts_dir(&self) -> PathBuf {
        self.build.source.join(&self.build.fonts)
    }

    /// Absolute path of the icon directory inside the output tree.
    ///
    /// Sprite input is read post-optimization, so the icons live under
    /// output once the image task has run.
    pub fn icons_output_dir(&self) -> PathBuf {
        self.build.output.join(&self.build.icons)
    }

    /// Fold CLI arguments into the loaded config.
    ///
    /// Root, source and output are pinned to absolute paths here, so
    /// tasks never depend on the process working directory. `start`
    /// flags override their `[serve]` counterparts; absent flags leave
    /// the file values alone.
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());
        let root = absolutize(&root);
        self.set_root(&root);

        self.config_path = absolutize(&root.join(&cli.config));
        self.build.source = absolutize(&root.join(&self.build.source));
        self.build.output = absolutize(&root.join(&self.build.output));

        if let Some(Commands::Start {
            interface,
            port,
            watch,
        }) = &cli.command
        {
            if let Some(interface) = interface {
                self.serve.interface = interface.clone();
            }
            if let Some(port) = port {
                self.serve.port = *port;
            }
            if let Some(watch) = watch {
                self.serve.watch = *watch;
            }
        }
    }

    /// Validate configuration for the current command.
    ///
    /// Every command reads the source tree, so its absence is fatal.
    pub fn validate(&self) -> Result<()> {
        if !self.build.source.is_dir() {
            bail!(ConfigError::Invalid(format!(
                "source directory not found: {}",
                self.build.source.display()
            )));
        }

        if self.build.jpeg_quality == 0 || self.build.jpeg_quality > 100 {
            bail!(ConfigError::Invalid(format!(
                "[build.jpeg_quality] must be in 1..=100, got {}",
                self.build.jpeg_quality
            )));
        }

        if self.build.output.starts_with(&self.build.source) {
            bail!(ConfigError::Invalid(
                "[build.output] must not live inside [build.source]".into()
            ));
        }

        Ok(())
    }
}

/// Pin a path to an absolute form. Existing paths canonicalize (resolving
/// symlinks); paths that do not exist yet are joined onto the working
/// directory instead.
fn absolutize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
