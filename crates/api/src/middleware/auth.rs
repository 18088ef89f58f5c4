//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sitepulse_core::error::CoreError;
use sitepulse_core::types::UserId;
use sitepulse_tracker::CurrentUser;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// Extraction also publishes the user on their auth stream, so chat
/// sessions see the latest sign-in.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The auth provider's user id (from `claims.sub`).
    pub user_id: UserId,
    pub email: Option<String>,
}

impl AuthUser {
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.user_id.clone(),
            email: self.email.clone(),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let user = AuthUser {
            user_id: claims.sub,
            email: claims.email,
        };

        if !state.auth_hub.sign_in(&user.current_user(), claims.iat).await {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Session has been signed out".into(),
            )));
        }

        Ok(user)
    }
}
