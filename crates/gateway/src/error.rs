use bandshare_state::StateError;
use thiserror::Error;

/// Errors surfaced by the share lifecycle operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The caller supplied an empty band id, no fields, or an unknown field.
    #[error("validation error: {0}")]
    Validation(String),

    /// The store is unreachable or the gateway was built without one.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The token is missing, expired, or otherwise not servable.
    #[error("not found")]
    NotFound,

    /// An error occurred in the state store.
    #[error("state error: {0}")]
    State(#[from] StateError),
}

impl GatewayError {
    /// Classify a store failure: unreachable backends become
    /// [`GatewayError::Configuration`], everything else stays a state error.
    pub fn from_state(err: StateError) -> Self {
        if err.is_unavailable() {
            Self::Configuration(err.to_string())
        } else {
            Self::State(err)
        }
    }
}
