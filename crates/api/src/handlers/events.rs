//! Handler for the manager activity feed, read from the event trail.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use clarity_core::types::Timestamp;
use clarity_core::DbId;
use clarity_db::repositories::EventRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireManager;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size for the activity feed.
const DEFAULT_LIMIT: i64 = 50;

/// Hard page-size cap.
const MAX_LIMIT: i64 = 200;

/// One feed entry: an event with its type resolved to a name.
#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    pub id: DbId,
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

/// GET /api/v1/activity
///
/// Recent events of the manager's company, newest first.
pub async fn company_activity(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ActivityEntry>>>> {
    let company_id = manager.company_scope()?;

    let limit = params.limit_or(DEFAULT_LIMIT, MAX_LIMIT);
    let offset = params.offset_or_zero();

    let type_names: HashMap<DbId, String> = EventRepo::list_event_types(&state.pool)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let events = EventRepo::list_recent_for_company(&state.pool, company_id, limit, offset).await?;

    let data = events
        .into_iter()
        .map(|event| ActivityEntry {
            id: event.id,
            event_type: type_names
                .get(&event.event_type_id)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            source_entity_type: event.source_entity_type,
            source_entity_id: event.source_entity_id,
            actor_user_id: event.actor_user_id,
            payload: event.payload,
            created_at: event.created_at,
        })
        .collect();

    Ok(Json(DataResponse { data }))
}
