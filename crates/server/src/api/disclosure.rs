use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use bandshare_core::{ShareSnapshot, TokenValue, VCARD_CONTENT_TYPE};
use bandshare_gateway::GatewayError;

use super::AppState;
use super::schemas::ErrorResponse;
use crate::error::ServerError;

/// `GET /v1/disclosures/{token}` -- open a one-time disclosure.
///
/// The first successful view consumes the token and disarms the band. Every
/// later, unknown or expired view returns `{"expired": true}`.
#[utoipa::path(
    get,
    path = "/v1/disclosures/{token}",
    tag = "Disclosures",
    summary = "View a disclosure",
    description = "Consumes the token and returns the owner's snapshot, or `{\"expired\": true}`.",
    params(("token" = String, Path, description = "Disclosure token from the tap redirect")),
    responses(
        (status = 200, description = "Snapshot of the shared fields, or `{\"expired\": true}` when the token is used, expired or unknown", body = ShareSnapshot)
    )
)]
pub async fn view(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let disclosure = state
        .gateway
        .view_disclosure(&TokenValue::new(token))
        .await?;
    Ok(Json(disclosure))
}

/// `GET /v1/disclosures/{token}/snapshot` -- re-read a disclosure without consuming it.
#[utoipa::path(
    get,
    path = "/v1/disclosures/{token}/snapshot",
    tag = "Disclosures",
    summary = "Re-read a disclosure",
    description = "Returns the snapshot for any unexpired token, used or not. Never consumes the token.",
    params(("token" = String, Path, description = "Disclosure token")),
    responses(
        (status = 200, description = "Snapshot of the shared fields", body = ShareSnapshot),
        (status = 410, description = "Token unknown or expired", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn snapshot(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let snapshot = state
        .gateway
        .snapshot(&TokenValue::new(token))
        .await?
        .ok_or(GatewayError::NotFound)?;
    Ok(Json(snapshot))
}

/// `GET /v1/disclosures/{token}/contact.vcf` -- download the disclosure as a vCard.
#[utoipa::path(
    get,
    path = "/v1/disclosures/{token}/contact.vcf",
    tag = "Disclosures",
    summary = "Download contact card",
    description = "Renders the snapshot as a vCard 3.0 attachment. Works after the disclosure was viewed.",
    params(("token" = String, Path, description = "Disclosure token")),
    responses(
        (status = 200, description = "vCard attachment", content_type = "text/vcard", body = String),
        (status = 410, description = "Token unknown or expired", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn contact_card(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let card = state
        .gateway
        .contact_card(&TokenValue::new(token))
        .await?;
    let disposition = format!("attachment; filename=\"{}\"", card.filename);
    Ok((
        [
            (header::CONTENT_TYPE, VCARD_CONTENT_TYPE.to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        card.body,
    ))
}
