//! Authentication extractors

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

fn authenticate(parts: &mut Parts, state: &ServerState, header: &str) -> Result<CurrentUser, AppError> {
    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    match state.jwt().validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            // Store in extensions for reuse by later extractors
            parts.extensions.insert(user.clone());
            Ok(user)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", parts.uri)
            );
            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

fn authorization(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

/// Requires a valid bearer token
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        match authorization(parts) {
            Some(header) => authenticate(parts, state, &header),
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                Err(AppError::unauthorized())
            }
        }
    }
}

/// Caller identity when a token is present
///
/// A missing header is anonymous; a present but invalid token is still
/// rejected.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

impl FromRequestParts<ServerState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(OptionalUser(Some(user.clone())));
        }

        match authorization(parts) {
            Some(header) => authenticate(parts, state, &header).map(|u| OptionalUser(Some(u))),
            None => Ok(OptionalUser(None)),
        }
    }
}
