//! Repository for the `journeys` table.

use clarity_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::journey::{Journey, JourneyOverviewRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, filled, filled_at, result_html, result_uploaded_at, \
                        result_uploaded_by, created_at, updated_at";

/// Provides operations for journey records.
pub struct JourneyRepo;

impl JourneyRepo {
    /// Ensure a journey row exists for `user_id`, returning it.
    ///
    /// Idempotent; called when an employee account is created and again
    /// defensively on first read.
    pub async fn ensure_for_user(pool: &PgPool, user_id: DbId) -> Result<Journey, sqlx::Error> {
        let query = format!(
            "INSERT INTO journeys (user_id)
             VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Journey>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Find the journey row for a user.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Journey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM journeys WHERE user_id = $1");
        sqlx::query_as::<_, Journey>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Record the assessment submission at `now`.
    ///
    /// Guarded one-shot: the `filled = false` predicate makes a second
    /// submission return `None` instead of moving the release instant.
    pub async fn submit(
        pool: &PgPool,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<Journey>, sqlx::Error> {
        let query = format!(
            "UPDATE journeys SET filled = true, filled_at = $2
             WHERE user_id = $1 AND filled = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Journey>(&query)
            .bind(user_id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Attach (or replace) the result document for a user's journey.
    ///
    /// Returns `None` if the user has no journey row.
    pub async fn attach_result(
        pool: &PgPool,
        user_id: DbId,
        result_html: &str,
        uploaded_by: DbId,
        now: Timestamp,
    ) -> Result<Option<Journey>, sqlx::Error> {
        let query = format!(
            "UPDATE journeys SET
                result_html = $2,
                result_uploaded_at = $3,
                result_uploaded_by = $4
             WHERE user_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Journey>(&query)
            .bind(user_id)
            .bind(result_html)
            .bind(now)
            .bind(uploaded_by)
            .fetch_optional(pool)
            .await
    }

    /// One dashboard row per active employee of the company: journey facts
    /// plus the count of answered workbook fields.
    pub async fn company_overview(
        pool: &PgPool,
        company_id: DbId,
    ) -> Result<Vec<JourneyOverviewRow>, sqlx::Error> {
        sqlx::query_as::<_, JourneyOverviewRow>(
            "SELECT
                u.id AS user_id,
                u.display_name,
                u.email,
                COALESCE(j.filled, false) AS filled,
                j.filled_at,
                (j.result_html IS NOT NULL) AS has_result,
                (SELECT COUNT(*) FROM workbook_entries w
                  WHERE w.user_id = u.id AND w.value <> '') AS answered_fields
             FROM users u
             LEFT JOIN journeys j ON j.user_id = u.id
             JOIN roles r ON r.id = u.role_id
             WHERE u.company_id = $1 AND u.is_active = true AND r.name = 'employee'
             ORDER BY u.display_name, u.id",
        )
        .bind(company_id)
        .fetch_all(pool)
        .await
    }
}
