//! Repository for the `events` and `event_types` tables.

use clarity_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{Event, EventType};

/// Column list for `event_types` queries.
const EVENT_TYPE_COLUMNS: &str =
    "id, name, category, description, is_critical, created_at, updated_at";

/// Column list for `events` queries.
const EVENT_COLUMNS: &str = "id, event_type_id, company_id, source_entity_type, \
                              source_entity_id, actor_user_id, payload, created_at";

/// Provides read/write operations for events and event types.
pub struct EventRepo;

impl EventRepo {
    /// Find an event type by its dot-separated name (e.g. `"journey.submitted"`).
    pub async fn get_event_type_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<EventType>, sqlx::Error> {
        let query = format!("SELECT {EVENT_TYPE_COLUMNS} FROM event_types WHERE name = $1");
        sqlx::query_as::<_, EventType>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all event types ordered by category then name.
    pub async fn list_event_types(pool: &PgPool) -> Result<Vec<EventType>, sqlx::Error> {
        let query = format!("SELECT {EVENT_TYPE_COLUMNS} FROM event_types ORDER BY category, name");
        sqlx::query_as::<_, EventType>(&query).fetch_all(pool).await
    }

    /// Check whether an event type is flagged critical.
    ///
    /// Unknown names report `false`; the notification router treats events
    /// without a registered type as non-critical noise.
    pub async fn is_critical(pool: &PgPool, event_type_name: &str) -> Result<bool, sqlx::Error> {
        let critical: Option<bool> =
            sqlx::query_scalar("SELECT is_critical FROM event_types WHERE name = $1")
                .bind(event_type_name)
                .fetch_optional(pool)
                .await?;
        Ok(critical.unwrap_or(false))
    }

    /// Insert a new event row, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        event_type_id: DbId,
        company_id: Option<DbId>,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events \
                (event_type_id, company_id, source_entity_type, source_entity_id, \
                 actor_user_id, payload) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(event_type_id)
        .bind(company_id)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor_user_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// List recent events for a company ordered newest-first.
    pub async fn list_recent_for_company(
        pool: &PgPool,
        company_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE company_id = $1
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(company_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
