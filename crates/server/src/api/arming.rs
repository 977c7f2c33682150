use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};

use bandshare_core::BandId;
use bandshare_gateway::{GatewayError, parse_fields};
use bandshare_state::BandStore;

use super::AppState;
use super::schemas::{ArmRequest, ArmResponse, ErrorResponse, OkResponse, ShareStatusResponse};
use crate::auth::CallerIdentity;
use crate::error::ServerError;

/// Reject callers who do not own `band_id`.
///
/// Anonymous callers (auth disabled) and blank ids pass through; the gateway
/// reports the latter as a validation error.
async fn ensure_owner(
    state: &AppState,
    identity: &CallerIdentity,
    band_id: &BandId,
) -> Result<(), ServerError> {
    let Some(user) = identity.user_id.as_ref() else {
        return Ok(());
    };
    if band_id.is_blank() {
        return Ok(());
    }

    let band = state
        .gateway
        .state()
        .band_by_id(band_id)
        .await
        .map_err(GatewayError::from_state)?
        .ok_or_else(|| ServerError::NotFound(format!("band {band_id} not found")))?;

    if band.claimed_owner() != Some(user) {
        tracing::warn!(band_id = %band_id, user = %user, "arming request for a band the caller does not own");
        return Err(ServerError::Forbidden("band belongs to another user".into()));
    }
    Ok(())
}

/// `POST /v1/bands/{band_id}/arm` -- arm fields for the next tap.
#[utoipa::path(
    post,
    path = "/v1/bands/{band_id}/arm",
    tag = "Arming",
    summary = "Arm a band",
    description = "Selects the fields the next tap discloses and opens the arm window.",
    params(("band_id" = String, Path, description = "Band identifier")),
    request_body = ArmRequest,
    responses(
        (status = 200, description = "Band armed", body = ArmResponse),
        (status = 400, description = "No or unknown fields, or unknown band", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Band owned by another user", body = ErrorResponse),
        (status = 404, description = "Band not found", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn arm(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Path(band_id): Path<String>,
    Json(req): Json<ArmRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let band_id = BandId::new(band_id);
    ensure_owner(&state, &identity, &band_id).await?;

    let fields = parse_fields(&req.fields)?;
    let armed = state.gateway.arm(&band_id, &fields).await?;
    Ok(Json(ArmResponse {
        ok: true,
        armed_until: armed.armed_until,
    }))
}

/// `POST /v1/bands/{band_id}/disarm` -- stop sharing immediately.
#[utoipa::path(
    post,
    path = "/v1/bands/{band_id}/disarm",
    tag = "Arming",
    summary = "Disarm a band",
    params(("band_id" = String, Path, description = "Band identifier")),
    responses(
        (status = 200, description = "Band disarmed", body = OkResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Band owned by another user", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn disarm(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Path(band_id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let band_id = BandId::new(band_id);
    ensure_owner(&state, &identity, &band_id).await?;

    state.gateway.disarm(&band_id).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// `GET /v1/bands/{band_id}/share` -- current arming state for the dashboard.
#[utoipa::path(
    get,
    path = "/v1/bands/{band_id}/share",
    tag = "Arming",
    summary = "Get share status",
    params(("band_id" = String, Path, description = "Band identifier")),
    responses(
        (status = 200, description = "Current share state", body = ShareStatusResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Band owned by another user", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn share_status(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    Path(band_id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let band_id = BandId::new(band_id);
    ensure_owner(&state, &identity, &band_id).await?;

    let status = state.gateway.share_status(&band_id).await?;
    Ok(Json(ShareStatusResponse::from(status)))
}
