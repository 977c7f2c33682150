use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::field::FieldSet;
use crate::types::{BandCode, BandId, UserId};

/// Claim status of a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BandStatus {
    Unclaimed,
    Claimed,
}

impl BandStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unclaimed => "unclaimed",
            Self::Claimed => "claimed",
        }
    }

    /// Parse the stored representation. Unknown values read as unclaimed so
    /// a corrupt row sends the tap to onboarding instead of a dashboard.
    #[must_use]
    pub fn from_stored(s: &str) -> Self {
        if s == "claimed" {
            Self::Claimed
        } else {
            Self::Unclaimed
        }
    }
}

/// One physical wearable.
///
/// `owner` is set if and only if `status` is [`BandStatus::Claimed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Band {
    pub id: BandId,
    pub code: BandCode,
    pub status: BandStatus,
    pub owner: Option<UserId>,
}

impl Band {
    /// A freshly provisioned band nobody has claimed yet.
    #[must_use]
    pub fn unclaimed(code: impl Into<BandCode>) -> Self {
        Self {
            id: BandId::generate(),
            code: code.into(),
            status: BandStatus::Unclaimed,
            owner: None,
        }
    }

    /// A band already bound to an owner.
    #[must_use]
    pub fn claimed(code: impl Into<BandCode>, owner: impl Into<UserId>) -> Self {
        Self {
            id: BandId::generate(),
            code: code.into(),
            status: BandStatus::Claimed,
            owner: Some(owner.into()),
        }
    }

    /// The owner, when the band is claimed.
    #[must_use]
    pub fn claimed_owner(&self) -> Option<&UserId> {
        match (self.status, &self.owner) {
            (BandStatus::Claimed, Some(owner)) => Some(owner),
            _ => None,
        }
    }
}

/// The single mutable arming record of a band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BandShareState {
    pub band_id: BandId,
    pub armed: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<crate::field::ShareField>))]
    pub armed_fields: FieldSet,
    pub armed_until: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl BandShareState {
    /// State after an owner arms `fields` for `window`.
    #[must_use]
    pub fn armed(band_id: BandId, fields: FieldSet, window: Duration, now: DateTime<Utc>) -> Self {
        Self {
            band_id,
            armed: true,
            armed_fields: fields,
            armed_until: Some(now + window),
            updated_at: now,
        }
    }

    /// State after an explicit disarm.
    #[must_use]
    pub fn disarmed(band_id: BandId, now: DateTime<Utc>) -> Self {
        Self {
            band_id,
            armed: false,
            armed_fields: FieldSet::new(),
            armed_until: None,
            updated_at: now,
        }
    }

    /// Whether a tap at `now` should disclose.
    ///
    /// A null `armed_until` does not expire. Expiry is enforced here, at read
    /// time; nothing sweeps stale rows.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        let not_expired = self.armed_until.is_none_or(|until| until > now);
        self.armed && not_expired && !self.armed_fields.is_empty()
    }

    /// Seconds left in the arm window, for the owner's countdown display.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u64 {
        if !self.armed {
            return 0;
        }
        self.armed_until
            .map_or(0, |until| u64::try_from((until - now).num_seconds()).unwrap_or(0))
    }
}
