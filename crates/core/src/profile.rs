use serde::{Deserialize, Serialize};

use crate::field::ShareField;
use crate::types::UserId;

/// The owner's shareable identity fields.
///
/// Owned by the settings flow; the share lifecycle only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Profile {
    pub user_id: UserId,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub linkedin: Option<String>,
    pub x: Option<String>,
    pub youtube: Option<String>,
    pub whatsapp: Option<String>,
    pub snapchat: Option<String>,
    pub venmo: Option<String>,
    pub cashapp: Option<String>,
}

impl Profile {
    /// An empty profile for `user_id`.
    #[must_use]
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// Stored value of `field`, trimmed; `None` when absent or blank.
    #[must_use]
    pub fn value(&self, field: ShareField) -> Option<&str> {
        non_blank(self.raw(field))
    }

    /// Stored value of `field` exactly as persisted.
    #[must_use]
    pub fn raw(&self, field: ShareField) -> Option<&str> {
        match field {
            ShareField::Phone => &self.phone,
            ShareField::Email => &self.email,
            ShareField::Website => &self.website,
            ShareField::Instagram => &self.instagram,
            ShareField::Tiktok => &self.tiktok,
            ShareField::Linkedin => &self.linkedin,
            ShareField::X => &self.x,
            ShareField::Youtube => &self.youtube,
            ShareField::Whatsapp => &self.whatsapp,
            ShareField::Snapchat => &self.snapchat,
            ShareField::Venmo => &self.venmo,
            ShareField::Cashapp => &self.cashapp,
        }
        .as_deref()
    }

    /// Mutable slot for `field`.
    pub fn slot_mut(&mut self, field: ShareField) -> &mut Option<String> {
        match field {
            ShareField::Phone => &mut self.phone,
            ShareField::Email => &mut self.email,
            ShareField::Website => &mut self.website,
            ShareField::Instagram => &mut self.instagram,
            ShareField::Tiktok => &mut self.tiktok,
            ShareField::Linkedin => &mut self.linkedin,
            ShareField::X => &mut self.x,
            ShareField::Youtube => &mut self.youtube,
            ShareField::Whatsapp => &mut self.whatsapp,
            ShareField::Snapchat => &mut self.snapchat,
            ShareField::Venmo => &mut self.venmo,
            ShareField::Cashapp => &mut self.cashapp,
        }
    }

    /// Builder-style setter used by seeding and tests.
    #[must_use]
    pub fn with(mut self, field: ShareField, value: impl Into<String>) -> Self {
        *self.slot_mut(field) = Some(value.into());
        self
    }

    /// Builder-style name setter.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Trimmed display name, if any.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_trims_and_skips_blank() {
        let profile = Profile::new("u1")
            .with(ShareField::Phone, "  555-0100 ")
            .with(ShareField::Email, "   ");
        assert_eq!(profile.value(ShareField::Phone), Some("555-0100"));
        assert_eq!(profile.value(ShareField::Email), None);
        assert_eq!(profile.value(ShareField::Venmo), None);
    }

    #[test]
    fn every_field_has_a_slot() {
        let mut profile = Profile::new("u1");
        for field in ShareField::ALL {
            profile = profile.with(field, field.as_str());
        }
        for field in ShareField::ALL {
            assert_eq!(profile.value(field), Some(field.as_str()));
        }
    }

    #[test]
    fn display_name_blank_is_none() {
        assert_eq!(Profile::new("u").with_name(" ").display_name(), None);
        assert_eq!(Profile::new("u").with_name("Tyler").display_name(), Some("Tyler"));
    }
}
