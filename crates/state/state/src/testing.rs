use std::sync::Arc;

use chrono::{Duration, Utc};

use bandshare_core::{
    Band, BandCode, BandId, BandShareState, BandStatus, FieldSet, Profile, ShareField, ShareToken,
    TokenStatus, TokenValue, UserId,
};

use crate::error::StateError;
use crate::store::StateStore;

fn fields(list: &[ShareField]) -> FieldSet {
    list.iter().copied().collect()
}

fn token_for(band_id: &BandId, ttl: Duration) -> ShareToken {
    ShareToken::mint(
        band_id.clone(),
        ttl,
        bandshare_core::DEFAULT_TOKEN_BYTES,
        Utc::now(),
    )
}

/// Run the full state store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if any store call fails. Behavioral mismatches panic.
pub async fn run_store_conformance_tests(store: &dyn StateStore) -> Result<(), StateError> {
    test_band_missing(store).await?;
    test_put_band_and_lookup(store).await?;
    test_put_band_keeps_id_per_code(store).await?;
    test_share_state_upsert(store).await?;
    test_release_share_keeps_fields(store).await?;
    test_release_share_without_state(store).await?;
    test_profile_roundtrip(store).await?;
    test_token_insert_and_find(store).await?;
    test_token_duplicate_insert(store).await?;
    test_claim_once(store).await?;
    test_claim_expired(store).await?;
    test_claim_missing(store).await?;
    Ok(())
}

async fn test_band_missing(store: &dyn StateStore) -> Result<(), StateError> {
    let found = store.band_by_code(&BandCode::new("no-such-band")).await?;
    assert!(found.is_none(), "lookup of unknown code should return None");
    let found = store.band_by_id(&BandId::new("no-such-id")).await?;
    assert!(found.is_none(), "lookup of unknown id should return None");
    Ok(())
}

async fn test_put_band_and_lookup(store: &dyn StateStore) -> Result<(), StateError> {
    let band = Band::claimed("conf-claimed", "conf-owner");
    let stored = store.put_band(&band).await?;
    assert_eq!(stored, band);

    let by_code = store.band_by_code(&band.code).await?;
    assert_eq!(by_code.as_ref(), Some(&band));
    let by_id = store.band_by_id(&band.id).await?;
    assert_eq!(by_id.as_ref(), Some(&band));
    Ok(())
}

async fn test_put_band_keeps_id_per_code(store: &dyn StateStore) -> Result<(), StateError> {
    let first = store.put_band(&Band::unclaimed("conf-reclaim")).await?;
    assert_eq!(first.status, BandStatus::Unclaimed);

    let second = store
        .put_band(&Band::claimed("conf-reclaim", "conf-owner-2"))
        .await?;
    assert_eq!(second.id, first.id, "a code maps to at most one band row");
    assert_eq!(second.status, BandStatus::Claimed);
    assert_eq!(second.owner, Some(UserId::new("conf-owner-2")));

    let found = store.band_by_code(&BandCode::new("conf-reclaim")).await?;
    assert_eq!(found, Some(second));
    Ok(())
}

async fn test_share_state_upsert(store: &dyn StateStore) -> Result<(), StateError> {
    let band_id = BandId::new("conf-share");
    assert!(store.share_state(&band_id).await?.is_none());

    let now = Utc::now();
    let armed = BandShareState::armed(
        band_id.clone(),
        fields(&[ShareField::Instagram, ShareField::Phone]),
        Duration::seconds(60),
        now,
    );
    store.upsert_share_state(&armed).await?;
    let read = store.share_state(&band_id).await?.expect("state after arm");
    assert!(read.armed);
    assert_eq!(read.armed_fields, armed.armed_fields);
    assert_eq!(
        read.armed_until.map(|t| t.timestamp_millis()),
        armed.armed_until.map(|t| t.timestamp_millis())
    );

    // Last writer wins.
    let disarmed = BandShareState::disarmed(band_id.clone(), now);
    store.upsert_share_state(&disarmed).await?;
    let read = store.share_state(&band_id).await?.expect("state after disarm");
    assert!(!read.armed);
    assert!(read.armed_fields.is_empty());
    assert!(read.armed_until.is_none());
    Ok(())
}

async fn test_release_share_keeps_fields(store: &dyn StateStore) -> Result<(), StateError> {
    let band_id = BandId::new("conf-release");
    let now = Utc::now();
    let armed = BandShareState::armed(
        band_id.clone(),
        fields(&[ShareField::Email]),
        Duration::seconds(60),
        now,
    );
    store.upsert_share_state(&armed).await?;
    store.release_share(&band_id, now).await?;

    let read = store.share_state(&band_id).await?.expect("state after release");
    assert!(!read.armed);
    assert!(read.armed_until.is_none());
    assert_eq!(read.armed_fields, armed.armed_fields);
    assert!(!read.is_live(now));
    Ok(())
}

async fn test_release_share_without_state(store: &dyn StateStore) -> Result<(), StateError> {
    let band_id = BandId::new("conf-release-none");
    store.release_share(&band_id, Utc::now()).await?;
    assert!(store.share_state(&band_id).await?.is_none());
    Ok(())
}

async fn test_profile_roundtrip(store: &dyn StateStore) -> Result<(), StateError> {
    let profile = Profile::new("conf-profile")
        .with_name("Conformance")
        .with(ShareField::Cashapp, "$conf");
    store.put_profile(&profile).await?;
    let read = store.profile(&profile.user_id).await?;
    assert_eq!(read, Some(profile));
    assert!(store.profile(&UserId::new("nobody")).await?.is_none());
    Ok(())
}

async fn test_token_insert_and_find(store: &dyn StateStore) -> Result<(), StateError> {
    let token = token_for(&BandId::new("conf-token"), Duration::minutes(2));
    store.insert_token(&token).await?;
    let read = store.find_token(&token.token).await?.expect("token after insert");
    assert_eq!(read.status, TokenStatus::Active);
    assert_eq!(read.band_id, token.band_id);
    assert_eq!(read.expires_at, token.expires_at);
    assert!(store.find_token(&TokenValue::new("nope")).await?.is_none());
    Ok(())
}

async fn test_token_duplicate_insert(store: &dyn StateStore) -> Result<(), StateError> {
    let token = token_for(&BandId::new("conf-dup"), Duration::minutes(2));
    store.insert_token(&token).await?;
    let result = store.insert_token(&token).await;
    assert!(
        matches!(result, Err(StateError::Conflict(_))),
        "duplicate token insert should conflict"
    );
    Ok(())
}

async fn test_claim_once(store: &dyn StateStore) -> Result<(), StateError> {
    let token = token_for(&BandId::new("conf-claim"), Duration::minutes(2));
    store.insert_token(&token).await?;

    let now = Utc::now();
    let first = store.claim_token(&token.token, now).await?;
    let claimed = first.expect("first claim should match");
    assert_eq!(claimed.status, TokenStatus::Used);
    assert_eq!(claimed.band_id, token.band_id);

    let second = store.claim_token(&token.token, now).await?;
    assert!(second.is_none(), "second claim must not match");

    let read = store.find_token(&token.token).await?.expect("token still readable");
    assert_eq!(read.status, TokenStatus::Used);
    Ok(())
}

async fn test_claim_expired(store: &dyn StateStore) -> Result<(), StateError> {
    let token = token_for(&BandId::new("conf-expired"), Duration::minutes(2));
    store.insert_token(&token).await?;

    let later = token.expires_at + Duration::seconds(1);
    assert!(store.claim_token(&token.token, later).await?.is_none());
    // Exactly at the deadline is already expired.
    assert!(store.claim_token(&token.token, token.expires_at).await?.is_none());

    let read = store.find_token(&token.token).await?.expect("token still readable");
    assert_eq!(read.status, TokenStatus::Active, "failed claim must not mutate");
    Ok(())
}

async fn test_claim_missing(store: &dyn StateStore) -> Result<(), StateError> {
    let claimed = store
        .claim_token(&TokenValue::new("never-minted"), Utc::now())
        .await?;
    assert!(claimed.is_none());
    Ok(())
}

/// Race `contenders` concurrent claims against one token and return how many
/// matched. A conforming store always returns `1`.
///
/// # Errors
///
/// Returns an error if the insert or any claim fails.
pub async fn race_claims(store: Arc<dyn StateStore>, contenders: usize) -> Result<usize, StateError> {
    let token = token_for(&BandId::new("conf-race"), Duration::minutes(2));
    store.insert_token(&token).await?;

    let now = Utc::now();
    let mut handles = Vec::with_capacity(contenders);
    for _ in 0..contenders {
        let store = Arc::clone(&store);
        let value = token.token.clone();
        handles.push(tokio::spawn(async move { store.claim_token(&value, now).await }));
    }

    let mut matched = 0;
    for handle in handles {
        let result = handle
            .await
            .map_err(|e| StateError::Backend(format!("claim task panicked: {e}")))?;
        if result?.is_some() {
            matched += 1;
        }
    }
    Ok(matched)
}
