use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! newtype_string {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[cfg_attr(feature = "openapi", schema(value_type = String))]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the inner string as a str slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns `true` if the value is empty or only whitespace.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(BandId, "Internal identifier of a physical band.");
newtype_string!(
    BandCode,
    "Code printed on a band and encoded in its NFC tag."
);
newtype_string!(UserId, "Identifier of an account in the identity provider.");
newtype_string!(TokenValue, "Opaque random string naming a share token.");

impl BandId {
    /// Generate a fresh random band identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl TokenValue {
    /// Short, log-safe prefix of the token. Full token values are bearer
    /// capabilities and must not be logged.
    #[must_use]
    pub fn redacted(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(6)
            .map_or(self.0.len(), |(i, _)| i);
        &self.0[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_from_str() {
        let code = BandCode::from("B1");
        assert_eq!(code.as_str(), "B1");
        assert_eq!(&*code, "B1");
    }

    #[test]
    fn newtype_from_string() {
        let user = UserId::from("user-42".to_string());
        assert_eq!(user.to_string(), "user-42");
    }

    #[test]
    fn blank_detection() {
        assert!(BandId::new("").is_blank());
        assert!(BandId::new("   ").is_blank());
        assert!(!BandId::new("b-1").is_blank());
    }

    #[test]
    fn serde_transparent() {
        let code = BandCode::new("abc");
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: BandCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }

    #[test]
    fn token_redaction_keeps_prefix_only() {
        let token = TokenValue::new("0123456789abcdef");
        assert_eq!(token.redacted(), "012345");
        assert_eq!(TokenValue::new("abc").redacted(), "abc");
    }

    #[test]
    fn default_is_blank() {
        assert!(UserId::default().is_blank());
        assert!(crate::profile::Profile::default().user_id.is_blank());
    }

    #[test]
    fn generated_band_ids_are_unique() {
        assert_ne!(BandId::generate(), BandId::generate());
    }
}
