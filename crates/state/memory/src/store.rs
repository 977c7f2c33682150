use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use bandshare_core::{
    Band, BandCode, BandId, BandShareState, Profile, ShareToken, TokenStatus, TokenValue, UserId,
};
use bandshare_state::error::StateError;
use bandshare_state::store::{BandStore, ProfileStore, ShareStateStore, TokenStore};

/// In-memory state store backed by [`DashMap`]s, one per table.
///
/// The token claim runs under the shard write lock of the token's entry,
/// which makes the status check and the status write a single atomic step.
/// All async trait methods return immediately.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    codes: DashMap<BandCode, BandId>,
    bands: DashMap<BandId, Band>,
    share: DashMap<BandId, BandShareState>,
    profiles: DashMap<UserId, Profile>,
    tokens: DashMap<TokenValue, ShareToken>,
}

impl MemoryStateStore {
    /// Create a new, empty in-memory state store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens ever minted.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Every token minted for `band_id`, oldest first.
    pub fn tokens_for_band(&self, band_id: &BandId) -> Vec<ShareToken> {
        let mut tokens: Vec<ShareToken> = self
            .tokens
            .iter()
            .filter(|entry| &entry.band_id == band_id)
            .map(|entry| entry.value().clone())
            .collect();
        tokens.sort_by_key(|t| t.created_at);
        tokens
    }
}

#[async_trait]
impl BandStore for MemoryStateStore {
    async fn band_by_code(&self, code: &BandCode) -> Result<Option<Band>, StateError> {
        let Some(id) = self.codes.get(code).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };
        Ok(self.bands.get(&id).map(|entry| entry.value().clone()))
    }

    async fn band_by_id(&self, id: &BandId) -> Result<Option<Band>, StateError> {
        Ok(self.bands.get(id).map(|entry| entry.value().clone()))
    }

    async fn put_band(&self, band: &Band) -> Result<Band, StateError> {
        let id = self
            .codes
            .entry(band.code.clone())
            .or_insert_with(|| band.id.clone())
            .value()
            .clone();

        let stored = Band {
            id: id.clone(),
            ..band.clone()
        };
        self.bands.insert(id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl ShareStateStore for MemoryStateStore {
    async fn share_state(&self, band_id: &BandId) -> Result<Option<BandShareState>, StateError> {
        Ok(self.share.get(band_id).map(|entry| entry.value().clone()))
    }

    async fn upsert_share_state(&self, state: &BandShareState) -> Result<(), StateError> {
        self.share.insert(state.band_id.clone(), state.clone());
        Ok(())
    }

    async fn release_share(&self, band_id: &BandId, now: DateTime<Utc>) -> Result<(), StateError> {
        if let Some(mut entry) = self.share.get_mut(band_id) {
            entry.armed = false;
            entry.armed_until = None;
            entry.updated_at = now;
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStateStore {
    async fn profile(&self, user_id: &UserId) -> Result<Option<Profile>, StateError> {
        Ok(self.profiles.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn put_profile(&self, profile: &Profile) -> Result<(), StateError> {
        self.profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MemoryStateStore {
    async fn insert_token(&self, token: &ShareToken) -> Result<(), StateError> {
        match self.tokens.entry(token.token.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StateError::Conflict(format!(
                "token {} already exists",
                token.token.redacted()
            ))),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(token.clone());
                Ok(())
            }
        }
    }

    async fn find_token(&self, token: &TokenValue) -> Result<Option<ShareToken>, StateError> {
        Ok(self.tokens.get(token).map(|entry| entry.value().clone()))
    }

    async fn claim_token(
        &self,
        token: &TokenValue,
        now: DateTime<Utc>,
    ) -> Result<Option<ShareToken>, StateError> {
        // The write guard is held across check and update.
        let Some(mut entry) = self.tokens.get_mut(token) else {
            return Ok(None);
        };
        if !entry.is_claimable(now) {
            return Ok(None);
        }
        entry.status = TokenStatus::Used;
        Ok(Some(entry.value().clone()))
    }
}
