//! Repository for the `invites` table.

use clarity_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::invite::{CreateInvite, Invite};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, invited_by, email, role_id, token_hash, token_prefix, \
                        expires_at, accepted_at, accepted_by, revoked_at, created_at, updated_at";

/// Provides CRUD operations for invites.
pub struct InviteRepo;

impl InviteRepo {
    /// Insert a new invite, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateInvite) -> Result<Invite, sqlx::Error> {
        let query = format!(
            "INSERT INTO invites
                (company_id, invited_by, email, role_id, token_hash, token_prefix, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invite>(&query)
            .bind(input.company_id)
            .bind(input.invited_by)
            .bind(&input.email)
            .bind(input.role_id)
            .bind(&input.token_hash)
            .bind(&input.token_prefix)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an invite by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invite>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invites WHERE id = $1");
        sqlx::query_as::<_, Invite>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an invite by its token hash, regardless of state.
    ///
    /// Acceptance, revocation, and expiry are judged by the caller against
    /// an injected clock so the rejection reason can be reported precisely.
    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Invite>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invites WHERE token_hash = $1");
        sqlx::query_as::<_, Invite>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// List all invites for a company, newest first.
    pub async fn list_for_company(
        pool: &PgPool,
        company_id: DbId,
    ) -> Result<Vec<Invite>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invites WHERE company_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Invite>(&query)
            .bind(company_id)
            .fetch_all(pool)
            .await
    }

    /// Mark an invite accepted by `user_id` at `now`. Guarded so a token
    /// can only be consumed once; returns `None` if the invite was already
    /// accepted or revoked.
    pub async fn mark_accepted(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<Invite>, sqlx::Error> {
        let query = format!(
            "UPDATE invites SET accepted_at = $3, accepted_by = $2
             WHERE id = $1 AND accepted_at IS NULL AND revoked_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invite>(&query)
            .bind(id)
            .bind(user_id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a pending invite. Returns `true` if the row was updated.
    pub async fn revoke(pool: &PgPool, id: DbId, now: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE invites SET revoked_at = $2
             WHERE id = $1 AND accepted_at IS NULL AND revoked_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete unaccepted invites that expired before `cutoff`. Returns the
    /// count of deleted rows.
    pub async fn cleanup_expired(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM invites WHERE accepted_at IS NULL AND expires_at < $1")
                .bind(cutoff)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
