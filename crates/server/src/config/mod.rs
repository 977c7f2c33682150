mod auth;
mod logging;
mod server;
mod share;
mod state;


pub use auth::*;
pub use logging::*;
pub use server::*;
pub use share::*;
pub use state::*;

use serde::Deserialize;

/// Top-level configuration for the Bandshare server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct BandshareConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// State backend configuration.
    #[serde(default)]
    pub state: StateConfig,
    /// Bearer token verification for owner routes.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Arm window and token parameters.
    #[serde(default)]
    pub share: ShareSettings,
    /// Log output format.
    #[serde(default)]
    pub logging: LoggingConfig,
}
