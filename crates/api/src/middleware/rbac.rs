//! Role-based access control extractors.
//!
//! Layering on top of [`AuthUser`] keeps the 401/403 distinction in one
//! place: a missing or bad token rejects with 401 before any role check,
//! and a valid token with the wrong role rejects with 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use clarity_core::error::CoreError;
use clarity_core::roles::{ROLE_ADMIN, ROLE_EMPLOYEE, ROLE_MANAGER};

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Requires the `admin` role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires the `manager` role. Admins pass as well.
#[derive(Debug, Clone)]
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_MANAGER && user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Manager role required".into(),
            )));
        }
        Ok(RequireManager(user))
    }
}

/// Requires the `employee` role.
///
/// Managers and admins do not have journeys or workbooks of their own,
/// so employee self-service endpoints stay closed to them.
#[derive(Debug, Clone)]
pub struct RequireEmployee(pub AuthUser);

impl FromRequestParts<AppState> for RequireEmployee {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_EMPLOYEE {
            return Err(AppError::Core(CoreError::Forbidden(
                "Employee role required".into(),
            )));
        }
        Ok(RequireEmployee(user))
    }
}
