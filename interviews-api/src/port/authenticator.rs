//! Authentication collaborator - turns a request credential into a user id.

use crate::domain::UserId;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authorization token")]
    MissingToken,
    #[error("unsupported authorization scheme")]
    UnsupportedScheme,
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Verifies bearer credentials issued by the account system.
///
/// Only verification lives here; issuing credentials belongs to whoever owns
/// the accounts.
pub trait Authenticator: Send + Sync {
    fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Extracts the token from an `Authorization` header value.
///
/// Both `Token <jwt>` and `Bearer <jwt>` are accepted.
pub fn token_from_header(value: &str) -> Result<&str, AuthError> {
    let mut parts = value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::MissingToken)?;
    if scheme != "Token" && scheme != "Bearer" {
        return Err(AuthError::UnsupportedScheme);
    }
    parts.next().ok_or(AuthError::MissingToken)
}
