use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A contact field an owner may disclose on the next tap.
///
/// The vocabulary is closed and stable across every interface. Variant order
/// is the order items appear in a disclosure, so `BTreeSet<ShareField>`
/// iterates in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ShareField {
    Phone,
    Email,
    Website,
    Instagram,
    Tiktok,
    Linkedin,
    X,
    Youtube,
    Whatsapp,
    Snapchat,
    Venmo,
    Cashapp,
}

/// Set of fields armed on a band.
pub type FieldSet = BTreeSet<ShareField>;

/// Returned when a field identifier is outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown share field: {0}")]
pub struct UnknownFieldError(pub String);

impl ShareField {
    /// Every field, in presentation order.
    pub const ALL: [Self; 12] = [
        Self::Phone,
        Self::Email,
        Self::Website,
        Self::Instagram,
        Self::Tiktok,
        Self::Linkedin,
        Self::X,
        Self::Youtube,
        Self::Whatsapp,
        Self::Snapchat,
        Self::Venmo,
        Self::Cashapp,
    ];

    /// Wire identifier of the field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Website => "website",
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
            Self::Linkedin => "linkedin",
            Self::X => "x",
            Self::Youtube => "youtube",
            Self::Whatsapp => "whatsapp",
            Self::Snapchat => "snapchat",
            Self::Venmo => "venmo",
            Self::Cashapp => "cashapp",
        }
    }

    /// Human-readable label shown next to the value.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Phone => "Phone",
            Self::Email => "Email",
            Self::Website => "Website",
            Self::Instagram => "Instagram",
            Self::Tiktok => "TikTok",
            Self::Linkedin => "LinkedIn",
            Self::X => "X",
            Self::Youtube => "YouTube",
            Self::Whatsapp => "WhatsApp",
            Self::Snapchat => "Snapchat",
            Self::Venmo => "Venmo",
            Self::Cashapp => "Cash App",
        }
    }

    /// Social and payment handles; exported as labeled links on a contact card.
    #[must_use]
    pub fn is_handle(self) -> bool {
        !matches!(self, Self::Phone | Self::Email | Self::Website)
    }

    /// Parse a list of wire identifiers into a set.
    ///
    /// Duplicates collapse. The first unknown identifier aborts the parse.
    pub fn parse_set<I, S>(raw: I) -> Result<FieldSet, UnknownFieldError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter().map(|s| s.as_ref().parse()).collect()
    }
}

impl fmt::Display for ShareField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareField {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| UnknownFieldError(s.to_owned()))
    }
}
