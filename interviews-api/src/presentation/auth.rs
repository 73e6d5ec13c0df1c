//! Identity extractors.
//!
//! `AuthUser` rejects the request with 401 before the handler runs;
//! `MaybeAuthUser` never rejects.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use crate::domain::UserId;
use crate::port::authenticator::{token_from_header, AuthError};

use super::error::ApiError;
use super::AppState;

/// Identity of a caller that presented a valid token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

/// Identity of the caller if a valid token was presented.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<UserId>);

fn verify(parts: &Parts, state: &AppState) -> Result<UserId, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::UnsupportedScheme)?;
    let token = token_from_header(header)?;
    state.authenticator.verify(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        verify(parts, state).map(AuthUser).map_err(|e| {
            debug!(error = %e, "rejecting unauthenticated request");
            ApiError::Auth(e)
        })
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match verify(parts, state) {
            Ok(id) => Ok(MaybeAuthUser(Some(id))),
            Err(AuthError::MissingToken) => Ok(MaybeAuthUser(None)),
            Err(e) => {
                debug!(error = %e, "ignoring unusable credential");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}
