//! `[serve]` section: development server settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[serve]` section in atelier.toml - development server settings.
///
/// The live-reload websocket listens one port above the HTTP server,
/// whichever port that ends up being after bind retries.
///
/// # Example
/// ```toml
/// [serve]
/// interface = "0.0.0.0"  # Listen on all interfaces
/// port = 8080
/// watch = true           # Re-run tasks on file changes
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    /// Interface the HTTP server binds. `127.0.0.1` keeps it local;
    /// `0.0.0.0` exposes it to the LAN for device testing.
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// HTTP port (default 3000).
    #[serde(default = "defaults::serve::port")]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,

    /// Watch the source tree and rerun affected tasks on change.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub watch: bool,
}
