use std::sync::Arc;

use chrono::Utc;

use super::{TokenGenerator, parse_token};
use crate::server::AppState;
use crate::types::{Token, User};

#[derive(Debug)]
pub enum TokenValidationError {
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    AdminTokenNotAllowed,
    InternalError,
}

pub struct ValidatedToken {
    pub token: Token,
    pub user: Option<User>,
}

/// Validates a raw token string against the store.
/// Returns the validated token and associated user (if any).
/// Set `allow_admin` to false to reject admin tokens.
pub fn validate_token(
    state: &Arc<AppState>,
    raw_token: &str,
    allow_admin: bool,
) -> Result<ValidatedToken, TokenValidationError> {
    let (lookup, _secret) = parse_token(raw_token).map_err(|_| TokenValidationError::InvalidToken)?;

    let token = state
        .store
        .get_token_by_lookup(&lookup)
        .map_err(|_| TokenValidationError::InternalError)?
        .ok_or(TokenValidationError::InvalidToken)?;

    let generator = TokenGenerator::new();
    if !generator
        .verify(raw_token, &token.token_hash)
        .map_err(|_| TokenValidationError::InternalError)?
    {
        return Err(TokenValidationError::InvalidToken);
    }

    if let Some(expires_at) = &token.expires_at {
        if expires_at < &Utc::now() {
            return Err(TokenValidationError::TokenExpired);
        }
    }

    if !allow_admin && token.is_admin {
        return Err(TokenValidationError::AdminTokenNotAllowed);
    }

    let user = match &token.user_id {
        Some(user_id) => state
            .store
            .get_user(user_id)
            .map_err(|_| TokenValidationError::InternalError)?,
        None => None,
    };

    if let Err(e) = state.store.update_token_last_used(&token.id) {
        tracing::warn!("Failed to update token last_used_at: {e}");
    }

    Ok(ValidatedToken { token, user })
}

/// Extracts the token from a Bearer Authorization header.
/// Returns None if no auth header is present.
/// Returns Err if the auth scheme is anything other than Bearer.
pub fn extract_bearer_token(
    auth_header: Option<&str>,
) -> Result<Option<String>, TokenValidationError> {
    match auth_header {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            Some(_) => Err(TokenValidationError::InvalidToken),
            None => Err(TokenValidationError::InvalidScheme),
        },
        None => Ok(None),
    }
}
