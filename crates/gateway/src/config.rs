use chrono::Duration;

use bandshare_core::DEFAULT_TOKEN_BYTES;

use crate::error::GatewayError;

/// Upper bound for both time windows: one day.
const MAX_WINDOW_SECONDS: u64 = 86_400;

/// Timing and token parameters of the share lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareConfig {
    /// How long an arm keeps the band live.
    pub arm_window_seconds: u64,
    /// How long a minted disclosure token stays valid.
    pub token_ttl_seconds: u64,
    /// Random bytes per token; the token string is twice as long in hex.
    pub token_bytes: usize,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            arm_window_seconds: 60,
            token_ttl_seconds: 120,
            token_bytes: DEFAULT_TOKEN_BYTES,
        }
    }
}

impl ShareConfig {
    /// Reject windows outside `1..=86400` seconds and tokens shorter than
    /// eight bytes.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if !(1..=MAX_WINDOW_SECONDS).contains(&self.arm_window_seconds) {
            return Err(GatewayError::Configuration(format!(
                "arm window must be between 1 and {MAX_WINDOW_SECONDS} seconds, got {}",
                self.arm_window_seconds
            )));
        }
        if !(1..=MAX_WINDOW_SECONDS).contains(&self.token_ttl_seconds) {
            return Err(GatewayError::Configuration(format!(
                "token ttl must be between 1 and {MAX_WINDOW_SECONDS} seconds, got {}",
                self.token_ttl_seconds
            )));
        }
        if !(8..=64).contains(&self.token_bytes) {
            return Err(GatewayError::Configuration(format!(
                "token bytes must be between 8 and 64, got {}",
                self.token_bytes
            )));
        }
        Ok(())
    }

    pub fn arm_window(&self) -> Duration {
        seconds(self.arm_window_seconds)
    }

    pub fn token_ttl(&self) -> Duration {
        seconds(self.token_ttl_seconds)
    }
}

fn seconds(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value.min(MAX_WINDOW_SECONDS)).unwrap_or(0))
}
