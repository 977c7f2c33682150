use bandshare_core::UserId;

/// Server-side caller identity extracted from authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The authenticated user, `None` when auth is disabled.
    pub user_id: Option<UserId>,
    /// Authentication method (`"jwt"` or `"anonymous"`).
    pub auth_method: String,
}

impl CallerIdentity {
    /// Identity injected when auth is disabled.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            auth_method: "anonymous".to_owned(),
        }
    }

    pub fn user(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            auth_method: "jwt".to_owned(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}
