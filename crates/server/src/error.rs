use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use bandshare_gateway::GatewayError;

/// Message returned for every store outage; the cause is only logged.
const UNAVAILABLE_MESSAGE: &str = "service temporarily unavailable, please try again";

/// Errors that can occur when running the Bandshare server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A share lifecycle error surfaced through the API.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Authentication failed (missing or invalid credentials).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller does not own the band.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The band does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::Gateway(GatewayError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Gateway(GatewayError::NotFound) => (StatusCode::GONE, "not found".to_owned()),
            Self::Gateway(e @ (GatewayError::Configuration(_) | GatewayError::State(_))) => {
                tracing::error!(error = %e, "store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    UNAVAILABLE_MESSAGE.to_owned(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
