//! Repository for the `workbook_entries` table.

use clarity_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::workbook::WorkbookEntry;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, field_key, value, saved_at, created_at, updated_at";

/// Provides operations for workbook entries.
///
/// Writes arrive from the autosave buffer, which may retry or overlap; the
/// upsert is keyed on `(user_id, field_key)` so duplicates collapse.
pub struct WorkbookRepo;

impl WorkbookRepo {
    /// Insert or replace the value for one field.
    pub async fn upsert_field(
        pool: &PgPool,
        user_id: DbId,
        field_key: &str,
        value: &str,
        saved_at: Timestamp,
    ) -> Result<WorkbookEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO workbook_entries (user_id, field_key, value, saved_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, field_key)
             DO UPDATE SET value = EXCLUDED.value, saved_at = EXCLUDED.saved_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkbookEntry>(&query)
            .bind(user_id)
            .bind(field_key)
            .bind(value)
            .bind(saved_at)
            .fetch_one(pool)
            .await
    }

    /// Delete one field's entry. Returns `true` if a row was removed.
    pub async fn clear_field(
        pool: &PgPool,
        user_id: DbId,
        field_key: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM workbook_entries WHERE user_id = $1 AND field_key = $2")
                .bind(user_id)
                .bind(field_key)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find one field's entry for a user.
    pub async fn find_field(
        pool: &PgPool,
        user_id: DbId,
        field_key: &str,
    ) -> Result<Option<WorkbookEntry>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM workbook_entries WHERE user_id = $1 AND field_key = $2");
        sqlx::query_as::<_, WorkbookEntry>(&query)
            .bind(user_id)
            .bind(field_key)
            .fetch_optional(pool)
            .await
    }

    /// All entries for a user, ordered by field key for stable output.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<WorkbookEntry>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM workbook_entries WHERE user_id = $1 ORDER BY field_key");
        sqlx::query_as::<_, WorkbookEntry>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Field keys holding a non-empty answer for a user.
    pub async fn answered_keys(pool: &PgPool, user_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT field_key FROM workbook_entries
             WHERE user_id = $1 AND value <> ''
             ORDER BY field_key",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
