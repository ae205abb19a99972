//! Service configuration passed explicitly into [`AccountManager`](crate::AccountManager).

const DEFAULT_ACCESS_TOKEN_TTL: i64 = 30;
/// Longest access-token lifetime the server accepts, one day.
pub const MAX_ACCESS_TOKEN_TTL: i64 = 24 * 60 * 60;
const DEFAULT_BCRYPT_COST: u32 = 10;

/// Secrets, token lifetimes and credential policy.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    pub access_secret: String,
    /// HMAC secret for refresh tokens, distinct from `access_secret`
    pub refresh_secret: String,
    /// Access token lifetime in seconds
    pub access_token_ttl: i64,
    /// bcrypt cost factor
    pub bcrypt_cost: u32,
    /// Clear every refresh token of an account when its password changes
    pub revoke_on_password_change: bool,
}

impl AuthConfig {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            revoke_on_password_change: true,
        }
    }

    pub fn with_access_ttl(mut self, seconds: i64) -> Self {
        self.access_token_ttl = seconds;
        self
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn with_revoke_on_password_change(mut self, revoke: bool) -> Self {
        self.revoke_on_password_change = revoke;
        self
    }
}

// Secrets stay out of logs and panics.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("revoke_on_password_change", &self.revoke_on_password_change)
            .finish_non_exhaustive()
    }
}
