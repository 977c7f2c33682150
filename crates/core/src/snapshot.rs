use serde::{Deserialize, Serialize};

use crate::field::{FieldSet, ShareField};
use crate::normalize::{href_for, normalize};
use crate::profile::Profile;

/// Title used when the owner has no display name.
pub const FALLBACK_DISPLAY_NAME: &str = "Shared contact";

/// One disclosed contact value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SnapshotItem {
    pub field: ShareField,
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// What a recipient sees for one token: the owner's name and the selected
/// fields that had a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ShareSnapshot {
    pub display_name: String,
    pub items: Vec<SnapshotItem>,
}

impl ShareSnapshot {
    /// Build the snapshot for `fields` from the owner's profile.
    ///
    /// Fields that are not selected, have no value, or normalize to nothing
    /// are omitted. Items follow vocabulary order.
    #[must_use]
    pub fn build(profile: Option<&Profile>, fields: &FieldSet) -> Self {
        let display_name = profile
            .and_then(Profile::display_name)
            .unwrap_or(FALLBACK_DISPLAY_NAME)
            .to_owned();

        let items = profile
            .map(|p| {
                fields
                    .iter()
                    .filter_map(|&field| {
                        let value = normalize(field, p.value(field)?)?;
                        Some(SnapshotItem {
                            field,
                            label: field.label().to_owned(),
                            href: Some(href_for(field, &value)),
                            value,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            display_name,
            items,
        }
    }

    /// The item for `field`, if disclosed.
    #[must_use]
    pub fn item(&self, field: ShareField) -> Option<&SnapshotItem> {
        self.items.iter().find(|i| i.field == field)
    }

    /// Disclosed fields in order.
    #[must_use]
    pub fn fields(&self) -> Vec<ShareField> {
        self.items.iter().map(|i| i.field).collect()
    }
}
