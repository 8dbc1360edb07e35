//! JWT Extractor
//!
//! Axum extractor that validates the bearer credential and yields the
//! authenticated caller. The token arrives either as an `Authorization:
//! Bearer` header or as the `token` cookie.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Reuse if some earlier layer already validated
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(AppError::unauthorized)?;

        match state.jwt_service.validate_token(&token) {
            Ok(claims) => {
                let user = CurrentUser::try_from(claims)
                    .map_err(|e| AppError::invalid_token(format!("Malformed claims: {e}")))?;
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            Err(JwtError::ExpiredToken) => Err(AppError::token_expired()),
            Err(e) => {
                tracing::warn!(error = %e, uri = %parts.uri, "token validation failed");
                Err(AppError::invalid_token("Invalid token"))
            }
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header)
        .map(str::to_string)
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let cookies = parts
        .headers
        .get(http::header::COOKIE)
        .and_then(|h| h.to_str().ok())?;
    cookies.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix("token=")
            .map(|value| value.to_string())
    })
}
