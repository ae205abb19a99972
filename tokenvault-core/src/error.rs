use thiserror::Error;

/// Common result type for core operations.
pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidField(String),
    #[error("the email {0} is already registered")]
    EmailTaken(String),
    #[error("the user with the email {0} is not registered")]
    NotRegistered(String),
    #[error("the password is not correct")]
    WrongPassword,
    #[error("{0}")]
    MalformedToken(String),
    #[error("the refresh token signature or format is invalid")]
    InvalidSignature,
    #[error("the user which the refresh token belongs to no longer exists")]
    AccountGone,
    #[error("the refresh token is no longer valid")]
    TokenRevoked,
    #[error("the account credentials changed during login, log in again")]
    CredentialsChanged,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("token signing failed: {0}")]
    Token(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AuthError {
    /// Failures the server caused; clients may retry but must not see the detail.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::Store(_)
                | AuthError::Hash(_)
                | AuthError::Token(_)
                | AuthError::Io(_)
                | AuthError::Serde(_)
        )
    }
}
