//! `[lint]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[lint]` section in atelier.toml - script linter settings.
///
/// # Example
/// ```toml
/// [lint]
/// exclude = ["bootstrap", "vendor"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    /// Directory names under `js/` whose files are never linted.
    #[serde(default = "defaults::lint::exclude")]
    #[educe(Default = defaults::lint::exclude())]
    pub exclude: Vec<PathBuf>,
}
