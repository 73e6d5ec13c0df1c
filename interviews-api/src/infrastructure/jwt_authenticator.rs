//! HS256 JWT implementation of the authentication collaborator.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{User, UserId};
use crate::port::authenticator::{AuthError, Authenticator};

/// Lifetime of tokens issued by [`JwtAuthenticator::issue`].
pub const TOKEN_LIFETIME_DAYS: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub id: String,
    pub username: String,
    /// Expiration as a unix timestamp.
    pub exp: i64,
}

pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
        }
    }

    /// Signs a token for `user`. Stands in for the account system's login.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.issue_with_lifetime(user, Duration::days(TOKEN_LIFETIME_DAYS))
    }

    pub fn issue_with_lifetime(&self, user: &User, lifetime: Duration) -> Result<String, AuthError> {
        let claims = Claims {
            id: user.id().to_string(),
            username: user.username().to_string(),
            exp: (Utc::now() + lifetime).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

impl Authenticator for JwtAuthenticator {
    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        data.claims
            .id
            .parse()
            .map_err(|e: uuid::Error| AuthError::InvalidToken(e.to_string()))
    }
}
