use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::types::{BandId, TokenValue};

/// Number of random bytes in a token when nothing else is configured
/// (32 lowercase hex characters).
pub const DEFAULT_TOKEN_BYTES: usize = 16;

/// Lifecycle status of a share token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    Active,
    Used,
}

impl TokenStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Used => "used",
        }
    }

    /// Parse the stored representation. Anything other than `active` is
    /// treated as spent.
    #[must_use]
    pub fn from_stored(s: &str) -> Self {
        if s == "active" { Self::Active } else { Self::Used }
    }
}

/// A single-use disclosure capability minted by a tap.
///
/// The token names a band only. What it discloses is the band's armed field
/// selection at the time the page or card is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareToken {
    pub token: TokenValue,
    pub band_id: BandId,
    pub status: TokenStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ShareToken {
    /// Mint a new active token with a fresh random value.
    #[must_use]
    pub fn mint(
        band_id: BandId,
        ttl: Duration,
        token_bytes: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            token: generate_token(token_bytes),
            band_id,
            status: TokenStatus::Active,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// Whether the page route may claim this token at `now`.
    #[must_use]
    pub fn is_claimable(&self, now: DateTime<Utc>) -> bool {
        self.status == TokenStatus::Active && self.expires_at > now
    }

    /// Whether the contact-file route may serve this token at `now`.
    /// Status is irrelevant here.
    #[must_use]
    pub fn is_servable(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Generate an unguessable lowercase hex token from the OS RNG.
#[must_use]
pub fn generate_token(bytes: usize) -> TokenValue {
    let mut buf = vec![0u8; bytes.max(1)];
    OsRng.fill_bytes(&mut buf);
    TokenValue::new(hex::encode(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minted(now: DateTime<Utc>) -> ShareToken {
        ShareToken::mint(
            BandId::new("b"),
            Duration::minutes(2),
            DEFAULT_TOKEN_BYTES,
            now,
        )
    }

    #[test]
    fn generated_tokens_are_fixed_length_hex() {
        let token = generate_token(DEFAULT_TOKEN_BYTES);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(generate_token(16), generate_token(16));
    }

    #[test]
    fn minted_token_is_active_for_ttl() {
        let now = Utc::now();
        let token = minted(now);
        assert_eq!(token.status, TokenStatus::Active);
        assert_eq!(token.expires_at, now + Duration::minutes(2));
        assert!(token.is_claimable(now));
        assert!(!token.is_claimable(now + Duration::minutes(2)));
    }

    #[test]
    fn used_token_is_servable_but_not_claimable() {
        let now = Utc::now();
        let mut token = minted(now);
        token.status = TokenStatus::Used;
        assert!(!token.is_claimable(now));
        assert!(token.is_servable(now + Duration::seconds(30)));
        assert!(!token.is_servable(now + Duration::minutes(3)));
    }

    #[test]
    fn stored_status_parsing() {
        assert_eq!(TokenStatus::from_stored("active"), TokenStatus::Active);
        assert_eq!(TokenStatus::from_stored("used"), TokenStatus::Used);
        assert_eq!(TokenStatus::from_stored("???"), TokenStatus::Used);
    }
}
