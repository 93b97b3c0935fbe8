//! `[build]` section configuration.
//!
//! Paths for the source and output trees plus per-task knobs.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in atelier.toml - pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// source = "source"          # Source tree
/// output = "build"           # Output tree (regenerated on every build)
/// style_entry = "scss/main.scss"
/// vendor = ["css/bootstrap", "js/bootstrap"]
/// jpeg_quality = 80
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Source tree holding stylesheets, markup, scripts, images and fonts.
    #[serde(default = "defaults::build::source")]
    #[educe(Default = defaults::build::source())]
    pub source: PathBuf,

    /// Output tree. Destroyed and fully regenerated on `build`/`start`.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Source-relative directories copied into output verbatim.
    #[serde(default = "defaults::build::vendor")]
    #[educe(Default = defaults::build::vendor())]
    pub vendor: Vec<PathBuf>,

    /// Entry stylesheet, relative to `source`. Includes are resolved by the
    /// Sass compiler from the entry's directory.
    #[serde(default = "defaults::build::style_entry")]
    #[educe(Default = defaults::build::style_entry())]
    pub style_entry: PathBuf,

    /// Icon directory merged into `sprite.svg`. The path is resolved
    /// against the output tree, where the image task has already placed
    /// the optimized icons.
    #[serde(default = "defaults::build::icons")]
    #[educe(Default = defaults::build::icons())]
    pub icons: PathBuf,

    /// TrueType font directory, relative to `source`.
    #[serde(default = "defaults::build::fonts")]
    #[educe(Default = defaults::build::fonts())]
    pub fonts: PathBuf,

    /// JPEG re-encode quality (1-100).
    #[serde(default = "defaults::build::jpeg_quality")]
    #[educe(Default = defaults::build::jpeg_quality())]
    pub jpeg_quality: u8,
}
