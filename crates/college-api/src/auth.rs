//! Bearer token extractors.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use college_core::{AuthUser, Role};

use crate::{ApiError, AppState};

/// Extractor for authenticated requests.
///
/// Validates the `Authorization: Bearer <token>` header and provides the
/// caller to handlers. Missing or invalid credentials are rejected with 401.
///
/// Usage:
/// ```ignore
/// async fn my_handler(Authenticated(user): Authenticated) -> impl IntoResponse {
///     // ... handler logic
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                header.trim_start_matches("Bearer ").trim()
            }
            _ => {
                return Err(ApiError::Unauthorized(
                    "Authentication required".to_string(),
                ))
            }
        };

        let claims = state.verifier.verify(token).map_err(|e| {
            tracing::debug!(subsystem = "auth", error = %e, "Bearer token rejected");
            ApiError::from(e)
        })?;

        Ok(Authenticated(claims.into()))
    }
}

/// Extractor that additionally requires the `admin` role (403 otherwise).
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(user) = Authenticated::from_request_parts(parts, state).await?;

        if let Err(e) = user.require_role(Role::Admin) {
            tracing::warn!(
                subsystem = "auth",
                user_id = %user.user_id,
                role = %user.role,
                "Admin endpoint refused"
            );
            return Err(e.into());
        }

        Ok(RequireAdmin(user))
    }
}
