//! Tap resolution: where a physical tap on a band should land.
//!
//! The decision is split into pure functions over lookup results so every
//! fail-open branch can be exercised without a store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use bandshare_core::{Band, BandCode, BandShareState, FieldSet, ShareToken, TokenValue};
use bandshare_state::{BandStore, ShareStateStore, StateError, TokenStore};

use crate::gateway::ShareGateway;

/// Where a tap goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "redirect", rename_all = "snake_case")]
pub enum TapDecision {
    /// Onboarding for unknown or unclaimed bands.
    Setup { band_code: BandCode },
    /// The owner's dashboard; also the fail-open destination.
    Dashboard { band_code: BandCode },
    /// A freshly minted one-time disclosure.
    Disclosure { token: TokenValue },
}

/// What the share state of a claimed band says about a tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareVerdict {
    /// Live: mint a token for these fields.
    Mint(FieldSet),
    /// Not armed, expired, or nothing selected.
    Dashboard,
    /// The share state could not be read.
    FailOpen,
}

/// Gate a tap on the band lookup. Returns the claimed band to continue with,
/// or the setup decision when the band is unknown, unreadable or unclaimed.
pub fn band_gate(
    code: &BandCode,
    lookup: Result<Option<Band>, StateError>,
) -> Result<Band, TapDecision> {
    let setup = || TapDecision::Setup {
        band_code: code.clone(),
    };
    match lookup {
        Ok(Some(band)) if band.claimed_owner().is_some() => Ok(band),
        Ok(_) => Err(setup()),
        Err(e) => {
            warn!(band_code = %code, error = %e, "band lookup failed, routing to setup");
            Err(setup())
        }
    }
}

/// Decide from the share state whether a tap at `now` should disclose.
pub fn share_verdict(
    lookup: Result<Option<BandShareState>, StateError>,
    now: DateTime<Utc>,
) -> ShareVerdict {
    match lookup {
        Ok(Some(state)) if state.is_live(now) => ShareVerdict::Mint(state.armed_fields),
        Ok(_) => ShareVerdict::Dashboard,
        Err(e) => {
            warn!(error = %e, "share state lookup failed, failing open");
            ShareVerdict::FailOpen
        }
    }
}

impl ShareGateway {
    /// Resolve a tap on `code`. Never fails: store errors degrade to the
    /// setup or dashboard destination.
    pub async fn resolve_tap(&self, code: &BandCode) -> TapDecision {
        self.resolve_tap_at(code, Utc::now()).await
    }

    #[instrument(name = "gateway.tap", skip_all, fields(band_code = %code))]
    pub async fn resolve_tap_at(&self, code: &BandCode, now: DateTime<Utc>) -> TapDecision {
        self.metrics.increment_taps();

        if code.is_blank() {
            self.metrics.increment_taps_setup();
            return TapDecision::Setup {
                band_code: code.clone(),
            };
        }

        let band = match band_gate(code, self.state.band_by_code(code).await) {
            Ok(band) => band,
            Err(decision) => {
                debug!("band not claimed");
                self.metrics.increment_taps_setup();
                return decision;
            }
        };

        let dashboard = TapDecision::Dashboard {
            band_code: code.clone(),
        };

        let fields = match share_verdict(self.state.share_state(&band.id).await, now) {
            ShareVerdict::Mint(fields) => fields,
            ShareVerdict::Dashboard => {
                self.metrics.increment_taps_dashboard();
                return dashboard;
            }
            ShareVerdict::FailOpen => {
                self.metrics.increment_tap_fail_open();
                self.metrics.increment_taps_dashboard();
                return dashboard;
            }
        };

        let token = ShareToken::mint(
            band.id.clone(),
            self.config.token_ttl(),
            self.config.token_bytes,
            now,
        );
        if let Err(e) = self.state.insert_token(&token).await {
            warn!(band_id = %band.id, error = %e, "token mint failed, failing open");
            self.metrics.increment_tap_fail_open();
            self.metrics.increment_taps_dashboard();
            return dashboard;
        }

        self.metrics.increment_tokens_minted();
        info!(
            band_id = %band.id,
            token = token.token.redacted(),
            fields = fields.len(),
            "disclosure token minted"
        );
        TapDecision::Disclosure { token: token.token }
    }
}
