//! Owner-facing arm, disarm and share status operations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use bandshare_core::{BandId, BandShareState, FieldSet, ShareField};
use bandshare_state::{BandStore, ShareStateStore};

use crate::error::GatewayError;
use crate::gateway::ShareGateway;

/// Parse wire field identifiers, rejecting unknown ones.
pub fn parse_fields<I, S>(raw: I) -> Result<FieldSet, GatewayError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ShareField::parse_set(raw).map_err(|e| GatewayError::Validation(e.to_string()))
}

/// The owner's view of a band's share state.
///
/// `remaining_seconds` and `live` are derived from `armed_until` and the
/// request time; clients render their countdown from these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareStatus {
    pub armed: bool,
    pub fields: Vec<ShareField>,
    pub armed_until: Option<DateTime<Utc>>,
    pub remaining_seconds: u64,
    pub live: bool,
}

impl ShareStatus {
    fn from_state(state: Option<&BandShareState>, now: DateTime<Utc>) -> Self {
        match state {
            Some(s) => Self {
                armed: s.armed,
                fields: s.armed_fields.iter().copied().collect(),
                armed_until: s.armed_until,
                remaining_seconds: s.remaining_seconds(now),
                live: s.is_live(now),
            },
            None => Self {
                armed: false,
                fields: Vec::new(),
                armed_until: None,
                remaining_seconds: 0,
                live: false,
            },
        }
    }
}

fn require_band_id(band_id: &BandId) -> Result<(), GatewayError> {
    if band_id.is_blank() {
        return Err(GatewayError::Validation("band id is required".into()));
    }
    Ok(())
}

impl ShareGateway {
    /// Arm `fields` on a band for the configured window.
    pub async fn arm(
        &self,
        band_id: &BandId,
        fields: &FieldSet,
    ) -> Result<BandShareState, GatewayError> {
        self.arm_at(band_id, fields, Utc::now()).await
    }

    /// Arm `fields` as of `now`.
    ///
    /// Input validation happens before any store call. The band must exist;
    /// arming an unknown id is a validation error and writes nothing.
    #[instrument(name = "gateway.arm", skip_all, fields(band_id = %band_id))]
    pub async fn arm_at(
        &self,
        band_id: &BandId,
        fields: &FieldSet,
        now: DateTime<Utc>,
    ) -> Result<BandShareState, GatewayError> {
        require_band_id(band_id)?;
        if fields.is_empty() {
            return Err(GatewayError::Validation(
                "at least one field must be selected".into(),
            ));
        }

        let band = self
            .state
            .band_by_id(band_id)
            .await
            .map_err(GatewayError::from_state)?;
        if band.is_none() {
            return Err(GatewayError::Validation(format!("unknown band: {band_id}")));
        }

        let state =
            BandShareState::armed(band_id.clone(), fields.clone(), self.config.arm_window(), now);
        self.state
            .upsert_share_state(&state)
            .await
            .map_err(GatewayError::from_state)?;

        self.metrics.increment_arms();
        info!(fields = fields.len(), armed_until = ?state.armed_until, "band armed");
        Ok(state)
    }

    /// Disarm a band. Disarming an idle band succeeds.
    pub async fn disarm(&self, band_id: &BandId) -> Result<(), GatewayError> {
        self.disarm_at(band_id, Utc::now()).await
    }

    #[instrument(name = "gateway.disarm", skip_all, fields(band_id = %band_id))]
    pub async fn disarm_at(&self, band_id: &BandId, now: DateTime<Utc>) -> Result<(), GatewayError> {
        require_band_id(band_id)?;
        self.state
            .upsert_share_state(&BandShareState::disarmed(band_id.clone(), now))
            .await
            .map_err(GatewayError::from_state)?;

        self.metrics.increment_disarms();
        info!("band disarmed");
        Ok(())
    }

    /// Current share state of a band as the owner should see it.
    pub async fn share_status(&self, band_id: &BandId) -> Result<ShareStatus, GatewayError> {
        self.share_status_at(band_id, Utc::now()).await
    }

    pub async fn share_status_at(
        &self,
        band_id: &BandId,
        now: DateTime<Utc>,
    ) -> Result<ShareStatus, GatewayError> {
        require_band_id(band_id)?;
        let state = self
            .state
            .share_state(band_id)
            .await
            .map_err(GatewayError::from_state)?;
        Ok(ShareStatus::from_state(state.as_ref(), now))
    }
}
