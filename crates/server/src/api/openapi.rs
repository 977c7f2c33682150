#![allow(clippy::needless_for_each)]

use bandshare_core::{ShareField, ShareSnapshot, SnapshotItem};

use super::schemas::{
    ArmRequest, ArmResponse, ErrorResponse, ExpiredResponse, HealthResponse, MetricsResponse,
    OkResponse, ShareStatusResponse, TapRequest, TapResponse,
};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Bandshare API",
        version = "0.1.0",
        description = "HTTP API for tap-to-share NFC bands. Resolve taps, arm and disarm bands, and serve one-time disclosures.",
        license(name = "MIT")
    ),
    tags(
        (name = "Health", description = "Service health and metrics"),
        (name = "Tap", description = "Resolution of NFC band taps"),
        (name = "Arming", description = "Owner-facing share arming"),
        (name = "Disclosures", description = "One-time disclosures and contact card export")
    ),
    paths(
        super::health::health,
        super::health::metrics,
        super::tap::tap,
        super::tap::tap_json,
        super::arming::arm,
        super::arming::disarm,
        super::arming::share_status,
        super::disclosure::view,
        super::disclosure::snapshot,
        super::disclosure::contact_card,
    ),
    components(schemas(
        ErrorResponse,
        HealthResponse,
        MetricsResponse,
        TapRequest,
        TapResponse,
        ArmRequest,
        ArmResponse,
        OkResponse,
        ShareStatusResponse,
        ExpiredResponse,
        ShareField,
        ShareSnapshot,
        SnapshotItem,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::*;

    #[test]
    fn document_lists_share_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/b/{band_code}",
            "/v1/tap",
            "/v1/bands/{band_id}/arm",
            "/v1/bands/{band_id}/disarm",
            "/v1/bands/{band_id}/share",
            "/v1/disclosures/{token}",
            "/v1/disclosures/{token}/contact.vcf",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
