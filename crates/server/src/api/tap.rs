use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use bandshare_core::BandCode;
use bandshare_gateway::TapDecision;

use super::AppState;
use super::schemas::{TapRequest, TapResponse};

/// Path (and query) a decision redirects to, prefixed by `public_url`.
pub fn location(decision: &TapDecision, public_url: Option<&str>) -> String {
    let path = match decision {
        TapDecision::Setup { band_code } => {
            format!("/setup?band={}", utf8_percent_encode(band_code, NON_ALPHANUMERIC))
        }
        TapDecision::Dashboard { band_code } => {
            format!("/dashboard?band={}", utf8_percent_encode(band_code, NON_ALPHANUMERIC))
        }
        TapDecision::Disclosure { token } => format!("/s/{token}"),
    };
    match public_url {
        Some(base) => format!("{}{path}", base.trim_end_matches('/')),
        None => path,
    }
}

async fn resolve(state: &AppState, code: &str) -> Redirect {
    let decision = state.gateway.resolve_tap(&BandCode::new(code)).await;
    Redirect::to(&location(&decision, state.public_url.as_deref()))
}

/// `GET /b/{band_code}` -- the URL written to the band's NFC tag.
#[utoipa::path(
    get,
    path = "/b/{band_code}",
    tag = "Tap",
    summary = "Tap a band",
    description = "Redirects to onboarding, the owner dashboard, or a freshly minted one-time disclosure.",
    params(("band_code" = String, Path, description = "Code printed on the band")),
    responses(
        (status = 303, description = "Redirect to `/setup`, `/dashboard` or `/s/{token}`")
    )
)]
pub async fn tap(State(state): State<AppState>, Path(band_code): Path<String>) -> impl IntoResponse {
    resolve(&state, &band_code).await
}

/// `GET /b` -- a tag written without a code.
pub async fn tap_without_code(State(state): State<AppState>) -> impl IntoResponse {
    resolve(&state, "").await
}

/// `POST /v1/tap` -- resolve a tap without following a redirect.
#[utoipa::path(
    post,
    path = "/v1/tap",
    tag = "Tap",
    summary = "Resolve a tap",
    request_body = TapRequest,
    responses(
        (status = 200, description = "Tap decision", body = TapResponse)
    )
)]
pub async fn tap_json(
    State(state): State<AppState>,
    Json(req): Json<TapRequest>,
) -> impl IntoResponse {
    let decision = state
        .gateway
        .resolve_tap(&BandCode::new(req.band_code))
        .await;
    Json(TapResponse::from(decision))
}
