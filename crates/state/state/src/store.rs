use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bandshare_core::{Band, BandCode, BandId, BandShareState, Profile, ShareToken, TokenValue, UserId};

use crate::error::StateError;

/// Lookup of physical bands.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
#[async_trait]
pub trait BandStore: Send + Sync {
    /// Find a band by the code printed on it.
    async fn band_by_code(&self, code: &BandCode) -> Result<Option<Band>, StateError>;

    /// Find a band by its internal identifier.
    async fn band_by_id(&self, id: &BandId) -> Result<Option<Band>, StateError>;

    /// Insert or replace a band, keyed by code. The stored band keeps the id
    /// of an existing row with the same code. Returns the stored band.
    ///
    /// Used by provisioning and onboarding collaborators, never by the share
    /// lifecycle itself.
    async fn put_band(&self, band: &Band) -> Result<Band, StateError>;
}

/// The per-band arming record.
///
/// Writes are last-writer-wins; no version checks.
#[async_trait]
pub trait ShareStateStore: Send + Sync {
    /// Current share state of a band, `None` if it was never armed.
    async fn share_state(&self, band_id: &BandId) -> Result<Option<BandShareState>, StateError>;

    /// Insert or replace the share state, keyed by band id.
    async fn upsert_share_state(&self, state: &BandShareState) -> Result<(), StateError>;

    /// Set `armed = false` and `armed_until = null`, leaving the field
    /// selection in place. A band with no share state is left untouched.
    async fn release_share(&self, band_id: &BandId, now: DateTime<Utc>) -> Result<(), StateError>;
}

/// Owner profiles, read-only to the share lifecycle.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profile(&self, user_id: &UserId) -> Result<Option<Profile>, StateError>;

    /// Insert or replace a profile. Used by the settings collaborator and seeding.
    async fn put_profile(&self, profile: &Profile) -> Result<(), StateError>;
}

/// Share token persistence, including the one operation in the system that
/// must be atomic at the store level.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Insert a freshly minted token. Fails with [`StateError::Conflict`] if
    /// the token value already exists.
    async fn insert_token(&self, token: &ShareToken) -> Result<(), StateError>;

    /// Read a token regardless of status or expiry.
    async fn find_token(&self, token: &TokenValue) -> Result<Option<ShareToken>, StateError>;

    /// Atomically move a token from `active` to `used`.
    ///
    /// Matches only if the token exists, its status is `active`, and
    /// `expires_at > now`. Returns the updated row on a match and `None`
    /// otherwise. Under any number of concurrent callers for the same token,
    /// at most one receives `Some`.
    async fn claim_token(
        &self,
        token: &TokenValue,
        now: DateTime<Utc>,
    ) -> Result<Option<ShareToken>, StateError>;
}

/// A backend that holds every table the share lifecycle touches.
pub trait StateStore: BandStore + ShareStateStore + ProfileStore + TokenStore {}

impl<T> StateStore for T where T: BandStore + ShareStateStore + ProfileStore + TokenStore + ?Sized {}
