use std::sync::Arc;

use bandshare_state::StateStore;
use bandshare_state_memory::MemoryStateStore;
#[cfg(feature = "postgres")]
use bandshare_state_postgres::{PostgresConfig, PostgresStateStore};

use crate::config::StateConfig;
use crate::error::ServerError;

/// Construct a [`StateStore`] from configuration.
///
/// Pooled backends connect and run their migrations here.
pub async fn create_state(config: &StateConfig) -> Result<Arc<dyn StateStore>, ServerError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryStateStore::new())),
        #[cfg(feature = "postgres")]
        "postgres" => create_postgres(config).await,
        other => Err(ServerError::Config(format!(
            "unsupported state backend: {other} (is the feature enabled?)"
        ))),
    }
}

#[cfg(feature = "postgres")]
async fn create_postgres(config: &StateConfig) -> Result<Arc<dyn StateStore>, ServerError> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| ServerError::Config("postgres backend requires 'url' in [state]".into()))?;
    let defaults = PostgresConfig::default();
    let pg_config = PostgresConfig {
        url: url.to_owned(),
        table_prefix: config.prefix.clone().unwrap_or(defaults.table_prefix.clone()),
        pool_size: config.pool_size.unwrap_or(defaults.pool_size),
        ..defaults
    };
    let store = PostgresStateStore::new(pg_config)
        .await
        .map_err(|e| ServerError::Config(format!("postgres store: {e}")))?;
    Ok(Arc::new(store))
}
