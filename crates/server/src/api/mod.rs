pub mod arming;
pub mod disclosure;
pub mod health;
pub mod openapi;
pub mod schemas;
pub mod tap;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use bandshare_gateway::ShareGateway;

use crate::auth::JwtVerifier;
use crate::auth::middleware::AuthLayer;

use self::openapi::ApiDoc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The share lifecycle gateway.
    pub gateway: Arc<ShareGateway>,
    /// Bearer token verifier (None when auth is disabled).
    pub auth: Option<Arc<JwtVerifier>>,
    /// Origin prefixed to tap redirects; relative paths when unset.
    pub public_url: Option<String>,
}

/// Build the Axum router with all API routes, middleware, and Swagger UI.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        .route("/b", get(tap::tap_without_code))
        .route("/b/{band_code}", get(tap::tap))
        .route("/v1/tap", post(tap::tap_json))
        .route("/v1/disclosures/{token}", get(disclosure::view))
        .route("/v1/disclosures/{token}/snapshot", get(disclosure::snapshot))
        .route(
            "/v1/disclosures/{token}/contact.vcf",
            get(disclosure::contact_card),
        );

    let protected = Router::new()
        .route("/v1/bands/{band_id}/arm", post(arming::arm))
        .route("/v1/bands/{band_id}/disarm", post(arming::disarm))
        .route("/v1/bands/{band_id}/share", get(arming::share_status))
        .layer(AuthLayer::new(state.auth.clone()));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
