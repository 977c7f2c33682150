use serde::Deserialize;

use bandshare_gateway::ShareConfig;

/// Arm window and token parameters.
#[derive(Debug, Deserialize)]
pub struct ShareSettings {
    /// Seconds an arm keeps the band live.
    #[serde(default = "default_arm_window")]
    pub arm_window_seconds: u64,
    /// Seconds a minted disclosure token stays valid.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
    /// Random bytes per token.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
}

impl Default for ShareSettings {
    fn default() -> Self {
        Self {
            arm_window_seconds: default_arm_window(),
            token_ttl_seconds: default_token_ttl(),
            token_bytes: default_token_bytes(),
        }
    }
}

impl ShareSettings {
    pub fn to_share_config(&self) -> ShareConfig {
        ShareConfig {
            arm_window_seconds: self.arm_window_seconds,
            token_ttl_seconds: self.token_ttl_seconds,
            token_bytes: self.token_bytes,
        }
    }
}

fn default_arm_window() -> u64 {
    60
}

fn default_token_ttl() -> u64 {
    120
}

fn default_token_bytes() -> usize {
    bandshare_core::DEFAULT_TOKEN_BYTES
}
