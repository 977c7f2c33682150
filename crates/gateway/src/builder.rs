use std::sync::Arc;

use bandshare_state::StateStore;

use crate::config::ShareConfig;
use crate::error::GatewayError;
use crate::gateway::ShareGateway;
use crate::metrics::ShareMetrics;

/// Fluent builder for constructing a [`ShareGateway`].
///
/// A [`StateStore`] must be supplied. The share configuration defaults to a
/// 60 second arm window and a two minute token lifetime.
#[derive(Default)]
pub struct GatewayBuilder {
    state: Option<Arc<dyn StateStore>>,
    config: ShareConfig,
    metrics: Option<Arc<ShareMetrics>>,
}

impl GatewayBuilder {
    /// Create a new builder with all optional fields set to their defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the state store implementation.
    #[must_use]
    pub fn state(mut self, store: Arc<dyn StateStore>) -> Self {
        self.state = Some(store);
        self
    }

    /// Set the arm window, token lifetime and token length.
    #[must_use]
    pub fn config(mut self, config: ShareConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a metrics registry with the caller instead of creating one.
    #[must_use]
    pub fn metrics(mut self, metrics: Arc<ShareMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Consume the builder and produce a [`ShareGateway`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if no state store was set or
    /// the share configuration is out of range.
    pub fn build(self) -> Result<ShareGateway, GatewayError> {
        let state = self
            .state
            .ok_or_else(|| GatewayError::Configuration("state store is required".into()))?;

        self.config.validate()?;

        Ok(ShareGateway {
            state,
            config: self.config,
            metrics: self.metrics.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use bandshare_state_memory::MemoryStateStore;

    use super::*;

    #[test]
    fn build_requires_state() {
        let err = GatewayBuilder::new().build().unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn build_rejects_bad_config() {
        let result = GatewayBuilder::new()
            .state(Arc::new(MemoryStateStore::new()))
            .config(ShareConfig {
                token_ttl_seconds: 0,
                ..ShareConfig::default()
            })
            .build();
        assert!(matches!(result, Err(GatewayError::Configuration(_))));
    }

    #[test]
    fn build_shares_metrics() {
        let metrics = Arc::new(ShareMetrics::default());
        let gateway = GatewayBuilder::new()
            .state(Arc::new(MemoryStateStore::new()))
            .metrics(Arc::clone(&metrics))
            .build()
            .unwrap();
        gateway.metrics().increment_taps();
        assert_eq!(metrics.snapshot().taps, 1);
    }
}
