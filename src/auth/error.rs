use crate::store::StoreError;

/// Failures of the authentication core.
///
/// Business-rule rejections (`Validation`, `DuplicateUser`, `UserNotFound`,
/// `InvalidCredentials`) and token-gate failures are the client's fault. The
/// remaining variants are infrastructure failures and must only reach clients
/// as a generic server error.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },
    #[error("user already exists")]
    DuplicateUser,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token signature is invalid")]
    InvalidToken,
    #[error("token has expired")]
    ExpiredToken,
    #[error("token is malformed")]
    MalformedToken,
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Whether the failure is an infrastructure fault rather than a rejection
    /// of the client's input or credentials.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::Signing(_) | AuthError::Hashing(_) | AuthError::Store(_)
        )
    }
}
