//! Fixtures shared by the gateway unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bandshare_core::{
    Band, BandCode, BandId, BandShareState, FieldSet, Profile, ShareField, ShareToken, TokenValue,
    UserId,
};
use bandshare_state::{
    BandStore, ProfileStore, ShareStateStore, StateError, StateStore, TokenStore,
};
use bandshare_state_memory::MemoryStateStore;

use crate::builder::GatewayBuilder;
use crate::gateway::ShareGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    BandByCode,
    BandById,
    ShareState,
    UpsertShare,
    ReleaseShare,
    Profile,
    InsertToken,
    FindToken,
    ClaimToken,
}

impl Op {
    pub fn all() -> &'static [Op] {
        &[
            Op::BandByCode,
            Op::BandById,
            Op::ShareState,
            Op::UpsertShare,
            Op::ReleaseShare,
            Op::Profile,
            Op::InsertToken,
            Op::FindToken,
            Op::ClaimToken,
        ]
    }
}

/// A memory store whose selected operations always fail.
pub struct FailingStore {
    pub inner: MemoryStateStore,
    failing: Vec<Op>,
    unavailable: bool,
}

impl FailingStore {
    /// Selected operations fail as if the backend were unreachable.
    pub fn unavailable(ops: &[Op]) -> Self {
        Self {
            inner: MemoryStateStore::new(),
            failing: ops.to_vec(),
            unavailable: true,
        }
    }

    /// Selected operations fail with a backend error.
    pub fn broken(ops: &[Op]) -> Self {
        Self {
            unavailable: false,
            ..Self::unavailable(ops)
        }
    }

    fn check(&self, op: Op) -> Result<(), StateError> {
        if !self.failing.contains(&op) {
            return Ok(());
        }
        if self.unavailable {
            Err(StateError::Connection(format!("{op:?}: connection refused")))
        } else {
            Err(StateError::Backend(format!("{op:?}: injected failure")))
        }
    }
}

#[async_trait]
impl BandStore for FailingStore {
    async fn band_by_code(&self, code: &BandCode) -> Result<Option<Band>, StateError> {
        self.check(Op::BandByCode)?;
        self.inner.band_by_code(code).await
    }

    async fn band_by_id(&self, id: &BandId) -> Result<Option<Band>, StateError> {
        self.check(Op::BandById)?;
        self.inner.band_by_id(id).await
    }

    async fn put_band(&self, band: &Band) -> Result<Band, StateError> {
        self.inner.put_band(band).await
    }
}

#[async_trait]
impl ShareStateStore for FailingStore {
    async fn share_state(&self, band_id: &BandId) -> Result<Option<BandShareState>, StateError> {
        self.check(Op::ShareState)?;
        self.inner.share_state(band_id).await
    }

    async fn upsert_share_state(&self, state: &BandShareState) -> Result<(), StateError> {
        self.check(Op::UpsertShare)?;
        self.inner.upsert_share_state(state).await
    }

    async fn release_share(&self, band_id: &BandId, now: DateTime<Utc>) -> Result<(), StateError> {
        self.check(Op::ReleaseShare)?;
        self.inner.release_share(band_id, now).await
    }
}

#[async_trait]
impl ProfileStore for FailingStore {
    async fn profile(&self, user_id: &UserId) -> Result<Option<Profile>, StateError> {
        self.check(Op::Profile)?;
        self.inner.profile(user_id).await
    }

    async fn put_profile(&self, profile: &Profile) -> Result<(), StateError> {
        self.inner.put_profile(profile).await
    }
}

#[async_trait]
impl TokenStore for FailingStore {
    async fn insert_token(&self, token: &ShareToken) -> Result<(), StateError> {
        self.check(Op::InsertToken)?;
        self.inner.insert_token(token).await
    }

    async fn find_token(&self, token: &TokenValue) -> Result<Option<ShareToken>, StateError> {
        self.check(Op::FindToken)?;
        self.inner.find_token(token).await
    }

    async fn claim_token(
        &self,
        token: &TokenValue,
        now: DateTime<Utc>,
    ) -> Result<Option<ShareToken>, StateError> {
        self.check(Op::ClaimToken)?;
        self.inner.claim_token(token, now).await
    }
}

pub fn fields(list: &[ShareField]) -> FieldSet {
    list.iter().copied().collect()
}

pub fn gateway_with(store: Arc<dyn StateStore>) -> ShareGateway {
    GatewayBuilder::new().state(store).build().unwrap()
}

pub fn memory_gateway() -> (ShareGateway, Arc<MemoryStateStore>) {
    let store = Arc::new(MemoryStateStore::new());
    let gateway = gateway_with(Arc::clone(&store) as Arc<dyn StateStore>);
    (gateway, store)
}

/// Profile used across scenarios.
pub fn tyler(user: &str) -> Profile {
    Profile::new(user)
        .with_name("Tyler B")
        .with(ShareField::Instagram, "@tyler")
        .with(ShareField::Phone, "+1 555 0100")
        .with(ShareField::Email, "tyler@example.com")
        .with(ShareField::Cashapp, "$tyler")
}

/// Seed a claimed band `code` owned by `user` with the standard profile.
pub async fn seed_owner(store: &dyn StateStore, code: &str, user: &str) -> Band {
    store.put_profile(&tyler(user)).await.unwrap();
    store.put_band(&Band::claimed(code, user)).await.unwrap()
}
