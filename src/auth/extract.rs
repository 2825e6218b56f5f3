use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::models::Role;
use crate::state::AppState;
use crate::utils::error::AppError;

use super::token::{self, AuthClaims};

/// The authenticated caller, extracted from the bearer token. Handlers
/// that need a role beyond "logged in" call [`AuthUser::require_role`].
pub struct AuthUser(pub AuthClaims);

impl AuthUser {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.0.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::AuthError("Missing authorization header".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::AuthError("Malformed authorization header".to_string()))?;
        let claims = token::verify(token, &state.config.token_secret)
            .ok_or_else(|| AppError::AuthError("Invalid or expired token".to_string()))?;
        Ok(AuthUser(claims))
    }
}
