//! Handlers for the clarity journey: employee snapshot + submission, and
//! the admin result upload.
//!
//! All stage logic lives in `clarity_core::journey`; handlers only load
//! the record and attach the result document when the stage allows it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use clarity_core::error::CoreError;
use clarity_core::journey::{snapshot, JourneySnapshot, JourneyStage};
use clarity_core::types::Timestamp;
use clarity_core::DbId;
use clarity_db::models::journey::Journey;
use clarity_db::repositories::{JourneyRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireEmployee};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Employee-facing journey view: the derived snapshot plus the result
/// document once it is released.
#[derive(Debug, Serialize)]
pub struct JourneyView {
    #[serde(flatten)]
    pub snapshot: JourneySnapshot,
    /// Present only when the stage is `result_ready`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_html: Option<String>,
}

/// Request body for `PUT /admin/journeys/{user_id}/result`.
#[derive(Debug, Deserialize)]
pub struct UploadResultRequest {
    pub result_html: String,
    /// Required to replace an already-uploaded result.
    #[serde(default)]
    pub force: bool,
}

/// Admin-facing confirmation after a result upload. The document itself
/// is not echoed back.
#[derive(Debug, Serialize)]
pub struct ResultUploadedView {
    pub user_id: DbId,
    pub stage: JourneyStage,
    pub filled_at: Option<Timestamp>,
    pub result_uploaded_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Employee endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/me/journey
///
/// The authenticated employee's journey snapshot. Carries the result
/// document only once the release threshold has passed.
pub async fn my_journey(
    State(state): State<AppState>,
    RequireEmployee(user): RequireEmployee,
) -> AppResult<Json<DataResponse<JourneyView>>> {
    // Accounts created before the journey table existed get their row here.
    let journey = JourneyRepo::ensure_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse {
        data: journey_view(&state, &journey),
    }))
}

/// POST /api/v1/me/journey/submit
///
/// Mark the workbook as submitted, starting the release countdown. A
/// journey can be submitted exactly once; a second call is a 409.
pub async fn submit_journey(
    State(state): State<AppState>,
    RequireEmployee(user): RequireEmployee,
) -> AppResult<Json<DataResponse<JourneyView>>> {
    JourneyRepo::ensure_for_user(&state.pool, user.user_id).await?;

    let journey = JourneyRepo::submit(&state.pool, user.user_id, state.clock.now())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Journey has already been submitted".into(),
            ))
        })?;

    // The employee's manager gets the toast.
    let manager_id = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .and_then(|u| u.manager_id);

    let event = clarity_events::PlatformEvent::new("journey.submitted")
        .with_source("journey", journey.id)
        .with_actor(user.user_id)
        .with_payload(serde_json::json!({
            "user_id": user.user_id,
            "manager_id": manager_id,
        }));
    let event = match user.company_id {
        Some(company_id) => event.with_company(company_id),
        None => event,
    };
    state.event_bus.publish(event);

    Ok(Json(DataResponse {
        data: journey_view(&state, &journey),
    }))
}

// ---------------------------------------------------------------------------
// Admin endpoints
// ---------------------------------------------------------------------------

/// PUT /api/v1/admin/journeys/{user_id}/result
///
/// Attach the Journey Map document to an employee's journey. Replacing an
/// existing document requires `force: true`; every overwrite is recorded
/// on the event trail.
pub async fn upload_result(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<DbId>,
    Json(input): Json<UploadResultRequest>,
) -> AppResult<impl IntoResponse> {
    if input.result_html.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Result document must not be empty".into(),
        )));
    }

    let existing = JourneyRepo::find_by_user_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Journey",
                id: user_id,
            })
        })?;

    let replacing = existing.result_html.is_some();
    if replacing && !input.force {
        return Err(AppError::Core(CoreError::Conflict(
            "A result is already uploaded for this journey; set force to replace it".into(),
        )));
    }

    let journey = JourneyRepo::attach_result(
        &state.pool,
        user_id,
        &input.result_html,
        admin.user_id,
        state.clock.now(),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Journey",
            id: user_id,
        })
    })?;

    let company_id = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .and_then(|u| u.company_id);

    let event = clarity_events::PlatformEvent::new("journey.result_uploaded")
        .with_source("journey", journey.id)
        .with_actor(admin.user_id)
        .with_payload(serde_json::json!({
            "user_id": user_id,
            "replaced": replacing,
        }));
    let event = match company_id {
        Some(company_id) => event.with_company(company_id),
        None => event,
    };
    state.event_bus.publish(event);

    let view = ResultUploadedView {
        user_id,
        stage: snapshot(journey.facts(), &state.release_policy, state.clock.now()).stage,
        filled_at: journey.filled_at,
        result_uploaded_at: journey.result_uploaded_at,
    };
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the employee view, attaching the document only when released.
fn journey_view(state: &AppState, journey: &Journey) -> JourneyView {
    let snap = snapshot(journey.facts(), &state.release_policy, state.clock.now());
    let result_html = if snap.stage == JourneyStage::ResultReady {
        journey.result_html.clone()
    } else {
        None
    };
    JourneyView {
        snapshot: snap,
        result_html,
    }
}
