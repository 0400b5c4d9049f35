//! Invite entity model and DTOs.

use clarity_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// An invite row from the `invites` table.
///
/// Only the token hash is stored; the plaintext token exists solely in the
/// create response.
#[derive(Debug, Clone, FromRow)]
pub struct Invite {
    pub id: DbId,
    pub company_id: DbId,
    pub invited_by: DbId,
    pub email: String,
    pub role_id: DbId,
    pub token_hash: String,
    pub token_prefix: String,
    pub expires_at: Timestamp,
    pub accepted_at: Option<Timestamp>,
    pub accepted_by: Option<DbId>,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Invite {
    /// An invite is pending while it has been neither accepted nor revoked.
    /// Expiry is checked separately against an injected clock.
    pub fn is_pending(&self) -> bool {
        self.accepted_at.is_none() && self.revoked_at.is_none()
    }
}

/// DTO for creating a new invite.
pub struct CreateInvite {
    pub company_id: DbId,
    pub invited_by: DbId,
    pub email: String,
    pub role_id: DbId,
    pub token_hash: String,
    pub token_prefix: String,
    pub expires_at: Timestamp,
}

/// Invite representation for manager-facing listings (no token hash).
#[derive(Debug, Clone, Serialize)]
pub struct InviteResponse {
    pub id: DbId,
    pub email: String,
    pub role: String,
    pub token_prefix: String,
    pub expires_at: Timestamp,
    pub accepted_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
