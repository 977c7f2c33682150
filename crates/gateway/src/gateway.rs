use std::sync::Arc;

use bandshare_state::StateStore;

use crate::config::ShareConfig;
use crate::metrics::ShareMetrics;

/// Entry point for the tap share lifecycle.
///
/// Every operation has a `*_at` variant taking the current time explicitly;
/// the plain variants pass `Utc::now()`. The gateway holds no mutable state
/// of its own, so one instance is shared across all requests.
pub struct ShareGateway {
    // Note: manual `Debug` impl below because trait objects lack `Debug`.
    pub(crate) state: Arc<dyn StateStore>,
    pub(crate) config: ShareConfig,
    pub(crate) metrics: Arc<ShareMetrics>,
}

impl std::fmt::Debug for ShareGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareGateway")
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl ShareGateway {
    /// The backing store, for collaborators such as ownership checks.
    pub fn state(&self) -> &Arc<dyn StateStore> {
        &self.state
    }

    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    pub fn metrics(&self) -> &ShareMetrics {
        &self.metrics
    }
}
