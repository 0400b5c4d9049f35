//! User entity model and DTOs.

use clarity_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    /// `None` for platform admins; managers and employees always have one.
    pub company_id: Option<DbId>,
    pub role_id: DbId,
    /// The manager this employee reports to, if any.
    pub manager_id: Option<DbId>,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub company_id: Option<DbId>,
    pub email: String,
    pub display_name: String,
    /// Resolved role name (e.g. `"manager"`, `"employee"`).
    pub role: String,
    pub role_id: DbId,
    pub manager_id: Option<DbId>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub company_id: Option<DbId>,
    pub role_id: DbId,
    pub manager_id: Option<DbId>,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub display_name: Option<String>,
    pub role_id: Option<DbId>,
    pub manager_id: Option<DbId>,
    pub is_active: Option<bool>,
}
