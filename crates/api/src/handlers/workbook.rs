//! Handlers for the clarity workbook: the debounce-autosaved worksheet an
//! employee fills before submitting their journey.
//!
//! Writes go through the in-process autosave buffer and return 202
//! immediately. Reads overlay buffered edits on the persisted rows so
//! the employee always sees their own latest keystrokes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use clarity_core::debounce::SaveState;
use clarity_core::error::CoreError;
use clarity_core::workbook::{
    completion_percent, parse_field_key, validate_value, FieldKey, FieldKind, Section,
};
use clarity_core::DbId;
use clarity_db::repositories::WorkbookRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireEmployee;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `PUT /me/workbook/fields/{field_key}`.
#[derive(Debug, Deserialize)]
pub struct SaveFieldRequest {
    pub value: String,
}

/// Per-field save acknowledgement.
#[derive(Debug, Serialize)]
pub struct FieldSaveView {
    pub field_key: &'static str,
    pub save_state: SaveState,
}

/// One workbook field with its effective value and save indicator.
#[derive(Debug, Serialize)]
pub struct FieldView {
    pub field_key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Effective value: buffered edit if present, else the stored row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_state: Option<SaveState>,
}

/// One workbook section in display order.
#[derive(Debug, Serialize)]
pub struct SectionView {
    pub section: Section,
    pub title: &'static str,
    pub fields: Vec<FieldView>,
}

/// The whole workbook for the authenticated employee.
#[derive(Debug, Serialize)]
pub struct WorkbookView {
    pub sections: Vec<SectionView>,
    pub completion_percent: f64,
}

/// Response body for `POST /me/workbook/flush`.
#[derive(Debug, Serialize)]
pub struct FlushView {
    /// Number of pending fields persisted by this call.
    pub flushed: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// PUT /api/v1/me/workbook/fields/{field_key}
///
/// Buffer an edit for one field. Returns 202 Accepted with the save
/// indicator; the write lands once the field goes quiet. An empty value
/// clears the field.
pub async fn save_field(
    State(state): State<AppState>,
    RequireEmployee(user): RequireEmployee,
    Path(field_key): Path<String>,
    Json(input): Json<SaveFieldRequest>,
) -> AppResult<impl IntoResponse> {
    let key = parse_field_key(&field_key).map_err(AppError::Core)?;
    validate_value(key, &input.value).map_err(AppError::Core)?;

    let save_state = state.autosave.submit((user.user_id, key), input.value).await;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: FieldSaveView {
                field_key: key.as_str(),
                save_state,
            },
        }),
    ))
}

/// GET /api/v1/me/workbook
///
/// The full workbook, sections in display order, with buffered edits
/// overlaid on persisted values.
pub async fn my_workbook(
    State(state): State<AppState>,
    RequireEmployee(user): RequireEmployee,
) -> AppResult<Json<DataResponse<WorkbookView>>> {
    let user_id = user.user_id;

    let persisted = WorkbookRepo::list_for_user(&state.pool, user_id).await?;
    let overlay = state
        .autosave
        .overlay_matching(|(uid, _)| *uid == user_id)
        .await;

    let view = build_workbook_view(&persisted, &overlay);
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/me/workbook/flush
///
/// Persist every pending edit for the authenticated employee without
/// waiting out the quiet period. The submit page calls this before
/// `POST /me/journey/submit` so nothing is lost in the buffer.
pub async fn flush_workbook(
    State(state): State<AppState>,
    RequireEmployee(user): RequireEmployee,
) -> AppResult<Json<DataResponse<FlushView>>> {
    let user_id = user.user_id;
    let flushed = state
        .autosave
        .flush_matching(|(uid, _)| *uid == user_id)
        .await;

    let event = clarity_events::PlatformEvent::new("workbook.flushed")
        .with_actor(user_id)
        .with_payload(serde_json::json!({ "flushed": flushed }));
    let event = match user.company_id {
        Some(company_id) => event.with_company(company_id),
        None => event,
    };
    state.event_bus.publish(event);

    Ok(Json(DataResponse {
        data: FlushView { flushed },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Merge persisted rows and buffered edits into the sectioned view.
///
/// A buffered empty value hides the persisted row (the clear has not
/// landed yet but the employee already sees the field empty).
fn build_workbook_view(
    persisted: &[clarity_db::models::workbook::WorkbookEntry],
    overlay: &[((DbId, FieldKey), String, SaveState)],
) -> WorkbookView {
    let mut answered: Vec<FieldKey> = Vec::new();
    let mut sections = Vec::with_capacity(Section::ALL.len());

    for section in Section::ALL {
        let mut fields = Vec::with_capacity(section.fields().len());
        for &key in section.fields() {
            let buffered = overlay
                .iter()
                .find(|((_, k), _, _)| *k == key)
                .map(|(_, value, save_state)| (value, save_state));
            let stored = persisted.iter().find(|e| e.field_key == key.as_str());

            let (value, save_state) = match (buffered, stored) {
                (Some((value, save_state)), _) => {
                    (non_empty(value), Some(save_state.clone()))
                }
                (None, Some(entry)) => (
                    non_empty(&entry.value),
                    Some(SaveState::Saved { at: entry.saved_at }),
                ),
                (None, None) => (None, None),
            };

            if value.is_some() {
                answered.push(key);
            }
            fields.push(FieldView {
                field_key: key.as_str(),
                label: key.label(),
                kind: key.kind(),
                value,
                save_state,
            });
        }
        sections.push(SectionView {
            section: *section,
            title: section.title(),
            fields,
        });
    }

    WorkbookView {
        completion_percent: completion_percent(&answered),
        sections,
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
