pub mod band;
pub mod field;
pub mod normalize;
pub mod profile;
pub mod snapshot;
pub mod token;
pub mod types;
pub mod vcard;

pub use band::{Band, BandShareState, BandStatus};
pub use field::{FieldSet, ShareField, UnknownFieldError};
pub use normalize::{href_for, normalize};
pub use profile::Profile;
pub use snapshot::{FALLBACK_DISPLAY_NAME, ShareSnapshot, SnapshotItem};
pub use token::{DEFAULT_TOKEN_BYTES, ShareToken, TokenStatus, generate_token};
pub use types::{BandCode, BandId, TokenValue, UserId};
pub use vcard::{ContactCard, VCARD_CONTENT_TYPE};
