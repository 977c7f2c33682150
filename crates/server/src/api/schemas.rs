use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use bandshare_core::ShareField;
use bandshare_gateway::{MetricsSnapshot, ShareStatus, TapDecision};

/// Generic error response returned on failures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    #[schema(example = "at least one field must be selected")]
    pub error: String,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub metrics: MetricsResponse,
}

/// Share lifecycle counters since process start.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct MetricsResponse {
    pub taps: u64,
    pub taps_setup: u64,
    pub taps_dashboard: u64,
    pub tokens_minted: u64,
    pub tap_fail_open: u64,
    pub arms: u64,
    pub disarms: u64,
    pub disclosures_served: u64,
    pub disclosures_expired: u64,
    pub claim_failures: u64,
    pub forced_disarm_failures: u64,
    pub cards_served: u64,
    pub cards_missing: u64,
}

impl From<MetricsSnapshot> for MetricsResponse {
    fn from(snap: MetricsSnapshot) -> Self {
        Self {
            taps: snap.taps,
            taps_setup: snap.taps_setup,
            taps_dashboard: snap.taps_dashboard,
            tokens_minted: snap.tokens_minted,
            tap_fail_open: snap.tap_fail_open,
            arms: snap.arms,
            disarms: snap.disarms,
            disclosures_served: snap.disclosures_served,
            disclosures_expired: snap.disclosures_expired,
            claim_failures: snap.claim_failures,
            forced_disarm_failures: snap.forced_disarm_failures,
            cards_served: snap.cards_served,
            cards_missing: snap.cards_missing,
        }
    }
}

/// Request body for `POST /v1/tap`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TapRequest {
    /// Code printed on the band; may be empty.
    #[serde(default)]
    #[schema(example = "B1X9")]
    pub band_code: String,
}

/// Where a tap lands.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TapResponse {
    /// One of `setup`, `dashboard`, `disclosure`.
    #[schema(example = "disclosure")]
    pub redirect: String,
    /// Present for `setup` and `dashboard`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band_code: Option<String>,
    /// Present for `disclosure`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl From<TapDecision> for TapResponse {
    fn from(decision: TapDecision) -> Self {
        match decision {
            TapDecision::Setup { band_code } => Self {
                redirect: "setup".into(),
                band_code: Some(band_code.to_string()),
                token: None,
            },
            TapDecision::Dashboard { band_code } => Self {
                redirect: "dashboard".into(),
                band_code: Some(band_code.to_string()),
                token: None,
            },
            TapDecision::Disclosure { token } => Self {
                redirect: "disclosure".into(),
                band_code: None,
                token: Some(token.to_string()),
            },
        }
    }
}

/// Request body for `POST /v1/bands/{band_id}/arm`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ArmRequest {
    /// Field identifiers to disclose on the next tap.
    #[schema(example = json!(["instagram", "phone"]))]
    pub fields: Vec<String>,
}

/// Response body for a successful arm.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ArmResponse {
    pub ok: bool,
    pub armed_until: Option<DateTime<Utc>>,
}

/// Response body for a successful disarm.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

/// The owner's view of a band's share state.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareStatusResponse {
    pub armed: bool,
    pub fields: Vec<ShareField>,
    pub armed_until: Option<DateTime<Utc>>,
    /// Seconds left in the arm window, `0` when idle.
    pub remaining_seconds: u64,
    /// Whether a tap right now would disclose.
    pub live: bool,
}

impl From<ShareStatus> for ShareStatusResponse {
    fn from(status: ShareStatus) -> Self {
        Self {
            armed: status.armed,
            fields: status.fields,
            armed_until: status.armed_until,
            remaining_seconds: status.remaining_seconds,
            live: status.live,
        }
    }
}

/// Body returned for a token that cannot be disclosed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpiredResponse {
    #[schema(example = true)]
    pub expired: bool,
}
