use serde::Deserialize;

/// Environment variable consulted when `jwt_secret` is absent from the file.
pub const JWT_SECRET_ENV: &str = "BANDSHARE_JWT_SECRET";

/// Bearer token verification for owner-facing routes.
///
/// Tokens are issued by the external identity provider; this server only
/// verifies them.
#[derive(Debug, Default, Deserialize)]
pub struct AuthConfig {
    /// Whether owner routes require a bearer token. When disabled, every
    /// caller is anonymous and band ownership is not checked.
    #[serde(default)]
    pub enabled: bool,

    /// HS256 shared secret.
    pub jwt_secret: Option<String>,

    /// Expected `iss` claim, if any.
    pub issuer: Option<String>,

    /// Expected `aud` claim, if any.
    pub audience: Option<String>,
}

impl AuthConfig {
    /// The configured secret, falling back to [`JWT_SECRET_ENV`].
    pub fn resolve_secret(&self) -> Option<String> {
        self.jwt_secret
            .clone()
            .or_else(|| std::env::var(JWT_SECRET_ENV).ok())
            .filter(|s| !s.trim().is_empty())
    }
}
