//! Authentication middleware: extracts and validates the JWT on requests.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use clarity_core::error::CoreError;
use clarity_core::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated user, extracted from a valid `Authorization: Bearer` token.
///
/// Carries the tenant scope from the token so handlers never trust a
/// client-supplied company id.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Company the user belongs to. `None` for platform admins.
    pub company_id: Option<DbId>,
    pub role: String,
}

impl AuthUser {
    /// The company this user operates in.
    ///
    /// Fails with 403 for accounts without a company membership, which
    /// keeps tenant-scoped endpoints closed to platform admins.
    pub fn company_scope(&self) -> Result<DbId, AppError> {
        self.company_id.ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "This endpoint requires a company membership".into(),
            ))
        })
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing authorization header".into(),
                ))
            })?
            .to_str()
            .map_err(|_| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid authorization header".into(),
                ))
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Expected a bearer token".into()))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            company_id: claims.company_id,
            role: claims.role,
        })
    }
}
