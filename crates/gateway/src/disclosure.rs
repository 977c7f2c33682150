//! Disclosure consumption and contact card export.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, info, instrument, warn};

use bandshare_core::{ContactCard, Profile, ShareSnapshot, ShareToken, TokenValue};
use bandshare_state::{BandStore, ProfileStore, ShareStateStore, StateError, TokenStore};

use crate::error::GatewayError;
use crate::gateway::ShareGateway;

/// Result of opening a disclosure link.
///
/// Missing, used and expired tokens all collapse into [`Disclosure::Expired`]
/// so a recipient learns nothing about which case applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disclosure {
    Live(ShareSnapshot),
    Expired,
}

impl Disclosure {
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

impl Serialize for Disclosure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Live(snapshot) => snapshot.serialize(serializer),
            Self::Expired => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("expired", &true)?;
                map.end()
            }
        }
    }
}

impl ShareGateway {
    /// Open a disclosure link, consuming the token.
    pub async fn view_disclosure(&self, token: &TokenValue) -> Result<Disclosure, GatewayError> {
        self.view_disclosure_at(token, Utc::now()).await
    }

    /// Claim `token` and return the owner's snapshot, then disarm the band.
    ///
    /// Only the caller whose claim matches sees [`Disclosure::Live`]; every
    /// other view of the same token is [`Disclosure::Expired`]. Store errors
    /// during the claim or the reads after it degrade to the expired state,
    /// and the forced disarm is best-effort. This never returns `Err` today;
    /// the `Result` keeps the signature in line with the other operations.
    #[instrument(name = "gateway.disclosure", skip_all, fields(token = token.redacted()))]
    pub async fn view_disclosure_at(
        &self,
        token: &TokenValue,
        now: DateTime<Utc>,
    ) -> Result<Disclosure, GatewayError> {
        if token.is_blank() {
            self.metrics.increment_disclosures_expired();
            return Ok(Disclosure::Expired);
        }

        let claimed = match self.state.claim_token(token, now).await {
            Ok(claimed) => claimed,
            Err(e) => {
                warn!(error = %e, "token claim failed, showing expired");
                self.metrics.increment_claim_failures();
                self.metrics.increment_disclosures_expired();
                return Ok(Disclosure::Expired);
            }
        };
        let Some(claimed) = claimed else {
            debug!("token not claimable");
            self.metrics.increment_disclosures_expired();
            return Ok(Disclosure::Expired);
        };

        let snapshot = match self.render(&claimed).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(band_id = %claimed.band_id, error = %e, "snapshot read failed after claim");
                self.metrics.increment_disclosures_expired();
                return Ok(Disclosure::Expired);
            }
        };

        if let Err(e) = self.state.release_share(&claimed.band_id, now).await {
            warn!(band_id = %claimed.band_id, error = %e, "forced disarm failed, skipping");
            self.metrics.increment_forced_disarm_failures();
        }

        self.metrics.increment_disclosures_served();
        info!(
            band_id = %claimed.band_id,
            items = snapshot.items.len(),
            "disclosure served"
        );
        Ok(Disclosure::Live(snapshot))
    }

    /// Read-only snapshot of a token's disclosure.
    pub async fn snapshot(&self, token: &TokenValue) -> Result<Option<ShareSnapshot>, GatewayError> {
        self.snapshot_at(token, Utc::now()).await
    }

    /// Read-only snapshot for any unexpired token, used or not.
    ///
    /// Returns `None` for missing or expired tokens. Never claims, disarms
    /// or mints.
    pub async fn snapshot_at(
        &self,
        token: &TokenValue,
        now: DateTime<Utc>,
    ) -> Result<Option<ShareSnapshot>, GatewayError> {
        if token.is_blank() {
            return Ok(None);
        }
        let found = self
            .state
            .find_token(token)
            .await
            .map_err(GatewayError::from_state)?;
        let Some(found) = found.filter(|t| t.is_servable(now)) else {
            return Ok(None);
        };
        let snapshot = self
            .render(&found)
            .await
            .map_err(GatewayError::from_state)?;
        Ok(Some(snapshot))
    }

    /// Render the contact card for a token.
    pub async fn contact_card(&self, token: &TokenValue) -> Result<ContactCard, GatewayError> {
        self.contact_card_at(token, Utc::now()).await
    }

    /// Render the contact card for any unexpired token, regardless of status.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] when the token is missing or expired.
    #[instrument(name = "gateway.contact_card", skip_all, fields(token = token.redacted()))]
    pub async fn contact_card_at(
        &self,
        token: &TokenValue,
        now: DateTime<Utc>,
    ) -> Result<ContactCard, GatewayError> {
        let Some(snapshot) = self.snapshot_at(token, now).await? else {
            self.metrics.increment_cards_missing();
            return Err(GatewayError::NotFound);
        };
        self.metrics.increment_cards_served();
        Ok(ContactCard::from_snapshot(&snapshot))
    }

    /// Build the snapshot for a token from the band's current armed fields
    /// and its owner's profile.
    ///
    /// An owner disarm clears the selection, so a token minted before it
    /// renders no items.
    async fn render(&self, token: &ShareToken) -> Result<ShareSnapshot, StateError> {
        let (band, share) = tokio::try_join!(
            self.state.band_by_id(&token.band_id),
            self.state.share_state(&token.band_id),
        )?;

        let fields = share.map(|s| s.armed_fields).unwrap_or_default();

        let profile: Option<Profile> = match band.as_ref().and_then(|b| b.claimed_owner()) {
            Some(owner) => self.state.profile(owner).await?,
            None => None,
        };
        Ok(ShareSnapshot::build(profile.as_ref(), &fields))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use bandshare_core::{BandCode, BandId, ShareField, TokenStatus, VCARD_CONTENT_TYPE};
    use bandshare_state::{ShareStateStore, StateStore, TokenStore};

    use super::*;
    use crate::tap::TapDecision;
    use crate::testing::{FailingStore, Op, fields, gateway_with, memory_gateway, seed_owner};

    async fn arm_and_tap(
        gateway: &ShareGateway,
        band_id: &BandId,
        armed: &[ShareField],
        now: DateTime<Utc>,
    ) -> TokenValue {
        gateway.arm_at(band_id, &fields(armed), now).await.unwrap();
        match gateway.resolve_tap_at(&BandCode::new("B1"), now).await {
            TapDecision::Disclosure { token } => token,
            other => panic!("expected a disclosure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn scenario_a_single_use_disclosure() {
        let (gateway, store) = memory_gateway();
        let band = seed_owner(store.as_ref(), "B1", "u1").await;
        let now = Utc::now();
        let token = arm_and_tap(
            &gateway,
            &band.id,
            &[ShareField::Instagram, ShareField::Phone],
            now,
        )
        .await;

        let first = gateway.view_disclosure_at(&token, now).await.unwrap();
        let Disclosure::Live(snapshot) = first else {
            panic!("first open should be live");
        };
        assert_eq!(snapshot.display_name, "Tyler B");
        assert_eq!(
            snapshot.fields(),
            vec![ShareField::Phone, ShareField::Instagram]
        );
        assert_eq!(
            snapshot.item(ShareField::Instagram).unwrap().value,
            "https://instagram.com/tyler"
        );
        assert!(snapshot.item(ShareField::Email).is_none(), "not armed");

        let second = gateway.view_disclosure_at(&token, now).await.unwrap();
        assert_eq!(second, Disclosure::Expired);
        assert_eq!(
            serde_json::to_value(&second).unwrap(),
            serde_json::json!({"expired": true})
        );

        let snap = gateway.metrics().snapshot();
        assert_eq!(snap.disclosures_served, 1);
        assert_eq!(snap.disclosures_expired, 1);
    }

    #[tokio::test]
    async fn consumption_disarms_band() {
        let (gateway, store) = memory_gateway();
        let band = seed_owner(store.as_ref(), "B1", "u1").await;
        let now = Utc::now();
        let token = arm_and_tap(&gateway, &band.id, &[ShareField::Email], now).await;

        gateway.view_disclosure_at(&token, now).await.unwrap();

        let state = store.share_state(&band.id).await.unwrap().unwrap();
        assert!(!state.armed);
        assert!(state.armed_until.is_none());
        assert!(!state.is_live(now));

        let next = gateway.resolve_tap_at(&BandCode::new("B1"), now).await;
        assert!(matches!(next, TapDecision::Dashboard { .. }));
    }

    #[tokio::test]
    async fn unknown_and_blank_tokens_are_expired() {
        let (gateway, _) = memory_gateway();
        for t in ["", "deadbeef"] {
            let view = gateway.view_disclosure(&TokenValue::new(t)).await.unwrap();
            assert!(view.is_expired());
        }
    }

    #[tokio::test]
    async fn expired_token_is_never_claimed() {
        let (gateway, store) = memory_gateway();
        let band = seed_owner(store.as_ref(), "B1", "u1").await;
        let now = Utc::now();
        let token = arm_and_tap(&gateway, &band.id, &[ShareField::Phone], now).await;

        let later = now + Duration::minutes(2);
        let view = gateway.view_disclosure_at(&token, later).await.unwrap();
        assert_eq!(view, Disclosure::Expired);

        let stored = store.find_token(&token).await.unwrap().unwrap();
        assert_eq!(stored.status, TokenStatus::Active);
        // The band stays armed; only a live claim disarms.
        assert!(store.share_state(&band.id).await.unwrap().unwrap().armed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_views_disclose_once() {
        let (gateway, store) = memory_gateway();
        let band = seed_owner(store.as_ref(), "B1", "u1").await;
        let now = Utc::now();
        let token = arm_and_tap(&gateway, &band.id, &[ShareField::Phone], now).await;

        let gateway = Arc::new(gateway);
        let mut handles = Vec::new();
        for _ in 0..24 {
            let gateway = Arc::clone(&gateway);
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                gateway.view_disclosure_at(&token, now).await.unwrap()
            }));
        }

        let mut live = 0;
        for handle in handles {
            if !handle.await.unwrap().is_expired() {
                live += 1;
            }
        }
        assert_eq!(live, 1);
    }

    #[tokio::test]
    async fn claim_failure_is_expired() {
        let store = Arc::new(FailingStore::unavailable(&[Op::ClaimToken]));
        let gateway = gateway_with(store);
        let view = gateway
            .view_disclosure(&TokenValue::new("abc"))
            .await
            .unwrap();
        assert_eq!(view, Disclosure::Expired);

        let snap = gateway.metrics().snapshot();
        assert_eq!(snap.claim_failures, 1);
        assert_eq!(snap.disclosures_expired, 1);
    }

    #[tokio::test]
    async fn broken_claim_is_expired() {
        let store = Arc::new(FailingStore::broken(&[Op::ClaimToken]));
        let band = seed_owner(&store.inner, "B1", "u1").await;
        let gateway = gateway_with(Arc::clone(&store) as Arc<dyn StateStore>);
        let now = Utc::now();
        let token = arm_and_tap(&gateway, &band.id, &[ShareField::Phone], now).await;

        let view = gateway.view_disclosure_at(&token, now).await.unwrap();
        assert_eq!(view, Disclosure::Expired);
        assert!(store.inner.share_state(&band.id).await.unwrap().unwrap().armed);
    }

    #[tokio::test]
    async fn forced_disarm_failure_still_serves_snapshot() {
        let store = Arc::new(FailingStore::unavailable(&[Op::ReleaseShare]));
        let band = seed_owner(&store.inner, "B1", "u1").await;
        let gateway = gateway_with(Arc::clone(&store) as Arc<dyn StateStore>);
        let now = Utc::now();
        let token = arm_and_tap(&gateway, &band.id, &[ShareField::Phone], now).await;

        let view = gateway.view_disclosure_at(&token, now).await.unwrap();
        assert!(matches!(view, Disclosure::Live(_)));
        assert_eq!(gateway.metrics().snapshot().forced_disarm_failures, 1);
    }

    #[tokio::test]
    async fn profile_failure_after_claim_is_expired() {
        let store = Arc::new(FailingStore::broken(&[Op::Profile]));
        let band = seed_owner(&store.inner, "B1", "u1").await;
        let gateway = gateway_with(Arc::clone(&store) as Arc<dyn StateStore>);
        let now = Utc::now();
        let token = arm_and_tap(&gateway, &band.id, &[ShareField::Phone], now).await;

        let view = gateway.view_disclosure_at(&token, now).await.unwrap();
        assert_eq!(view, Disclosure::Expired);
        let stored = store.inner.find_token(&token).await.unwrap().unwrap();
        assert_eq!(stored.status, TokenStatus::Used, "claim is not rolled back");
    }

    #[tokio::test]
    async fn missing_profile_uses_fallback_name() {
        let (gateway, store) = memory_gateway();
        let band = store
            .put_band(&bandshare_core::Band::claimed("B1", "ghost"))
            .await
            .unwrap();
        let now = Utc::now();
        let token = arm_and_tap(&gateway, &band.id, &[ShareField::Phone], now).await;

        let Disclosure::Live(snapshot) = gateway.view_disclosure_at(&token, now).await.unwrap()
        else {
            panic!("claim should succeed");
        };
        assert_eq!(snapshot.display_name, bandshare_core::FALLBACK_DISPLAY_NAME);
        assert!(snapshot.items.is_empty());
    }

    #[tokio::test]
    async fn owner_disarm_before_view_discloses_nothing() {
        let (gateway, store) = memory_gateway();
        let band = seed_owner(store.as_ref(), "B1", "u1").await;
        let now = Utc::now();
        let token = arm_and_tap(&gateway, &band.id, &[ShareField::Phone], now).await;

        gateway.disarm_at(&band.id, now).await.unwrap();

        let Disclosure::Live(snapshot) = gateway.view_disclosure_at(&token, now).await.unwrap()
        else {
            panic!("the token itself is still claimable");
        };
        assert_eq!(snapshot.display_name, "Tyler B");
        assert!(snapshot.items.is_empty());

        let card = gateway.contact_card_at(&token, now).await.unwrap();
        assert!(!card.body.contains("TEL"));
    }

    #[tokio::test]
    async fn rearm_before_view_discloses_new_selection() {
        let (gateway, store) = memory_gateway();
        let band = seed_owner(store.as_ref(), "B1", "u1").await;
        let now = Utc::now();
        let token = arm_and_tap(&gateway, &band.id, &[ShareField::Phone], now).await;

        gateway
            .arm_at(&band.id, &fields(&[ShareField::Email]), now)
            .await
            .unwrap();

        let Disclosure::Live(snapshot) = gateway.view_disclosure_at(&token, now).await.unwrap()
        else {
            panic!("claim should succeed");
        };
        assert_eq!(snapshot.fields(), vec![ShareField::Email]);
    }

    #[tokio::test]
    async fn scenario_c_card_served_after_consumption() {
        let (gateway, store) = memory_gateway();
        let band = seed_owner(store.as_ref(), "B1", "u1").await;
        let now = Utc::now();
        let token = arm_and_tap(
            &gateway,
            &band.id,
            &[ShareField::Instagram, ShareField::Phone],
            now,
        )
        .await;

        let Disclosure::Live(page) = gateway.view_disclosure_at(&token, now).await.unwrap() else {
            panic!("first open should be live");
        };

        let later = now + Duration::seconds(30);
        let snapshot = gateway.snapshot_at(&token, later).await.unwrap().unwrap();
        assert_eq!(snapshot, page);

        let card = gateway.contact_card_at(&token, later).await.unwrap();
        assert!(card.body.contains("FN:Tyler B\r\n"));
        assert!(card.body.contains("TEL;TYPE=CELL:+1 555 0100\r\n"));
        assert!(card.body.contains("https://instagram.com/tyler"));
        assert!(!card.body.contains("EMAIL"));
        assert_eq!(card.filename, "tyler-b.vcf");
        assert!(VCARD_CONTENT_TYPE.starts_with("text/vcard"));
    }

    #[tokio::test]
    async fn card_for_active_token_does_not_consume() {
        let (gateway, store) = memory_gateway();
        let band = seed_owner(store.as_ref(), "B1", "u1").await;
        let now = Utc::now();
        let token = arm_and_tap(&gateway, &band.id, &[ShareField::Phone], now).await;

        gateway.contact_card_at(&token, now).await.unwrap();
        let stored = store.find_token(&token).await.unwrap().unwrap();
        assert_eq!(stored.status, TokenStatus::Active);
        assert!(store.share_state(&band.id).await.unwrap().unwrap().armed);
    }

    #[tokio::test]
    async fn card_for_missing_or_expired_token_is_not_found() {
        let (gateway, store) = memory_gateway();
        let band = seed_owner(store.as_ref(), "B1", "u1").await;
        let now = Utc::now();
        let token = arm_and_tap(&gateway, &band.id, &[ShareField::Phone], now).await;

        let err = gateway
            .contact_card_at(&token, now + Duration::minutes(2))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound));

        let err = gateway
            .contact_card(&TokenValue::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound));
        assert_eq!(gateway.metrics().snapshot().cards_missing, 2);
    }
}
