//! Handlers for training videos: the employee-facing catalog with watch
//! progress, and the admin-managed catalog itself.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use clarity_core::error::CoreError;
use clarity_core::types::Timestamp;
use clarity_core::DbId;
use clarity_db::models::training::{
    CreateTrainingVideo, TrainingProgress, TrainingVideo, UpdateTrainingVideo,
};
use clarity_db::repositories::TrainingRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireEmployee};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `PUT /me/training/{video_id}/progress`.
#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub watched_secs: i32,
    /// Set when the player reports the video finished.
    #[serde(default)]
    pub completed: bool,
}

/// One catalog entry with the employee's own progress merged in.
#[derive(Debug, Serialize)]
pub struct VideoWithProgress {
    #[serde(flatten)]
    pub video: TrainingVideo,
    pub watched_secs: i32,
    pub completed_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Employee endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/me/training
///
/// The published catalog visible to the employee's company, each video
/// carrying the employee's own watch progress.
pub async fn my_training(
    State(state): State<AppState>,
    RequireEmployee(user): RequireEmployee,
) -> AppResult<Json<DataResponse<Vec<VideoWithProgress>>>> {
    let company_id = user.company_scope()?;

    let videos = TrainingRepo::list_for_company(&state.pool, company_id).await?;
    let progress = TrainingRepo::progress_for_user(&state.pool, user.user_id).await?;

    let data = videos
        .into_iter()
        .map(|video| {
            let own = progress.iter().find(|p| p.video_id == video.id);
            VideoWithProgress {
                watched_secs: own.map_or(0, |p| p.watched_secs),
                completed_at: own.and_then(|p| p.completed_at),
                video,
            }
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/me/training/{video_id}/progress
///
/// Record watch progress. Progress only moves forward, and a completion
/// is permanent; stale reports from a second tab are absorbed.
pub async fn update_progress(
    State(state): State<AppState>,
    RequireEmployee(user): RequireEmployee,
    Path(video_id): Path<DbId>,
    Json(input): Json<UpdateProgressRequest>,
) -> AppResult<Json<DataResponse<TrainingProgress>>> {
    let company_id = user.company_scope()?;

    if input.watched_secs < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "watched_secs must not be negative".into(),
        )));
    }

    // The video must be active and visible to this company.
    let video = TrainingRepo::find_video(&state.pool, video_id)
        .await?
        .filter(|v| v.is_active)
        .filter(|v| v.company_id.is_none() || v.company_id == Some(company_id))
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "TrainingVideo",
                id: video_id,
            })
        })?;

    let already_completed = TrainingRepo::progress_for_user(&state.pool, user.user_id)
        .await?
        .iter()
        .any(|p| p.video_id == video_id && p.completed_at.is_some());

    let completed_at = if input.completed {
        Some(state.clock.now())
    } else {
        None
    };

    let progress = TrainingRepo::upsert_progress(
        &state.pool,
        user.user_id,
        video_id,
        input.watched_secs,
        completed_at,
    )
    .await?;

    if !already_completed && progress.completed_at.is_some() {
        let event = clarity_events::PlatformEvent::new("training.video_completed")
            .with_company(company_id)
            .with_source("training_video", video.id)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({
                "user_id": user.user_id,
                "title": video.title,
            }));
        state.event_bus.publish(event);
    }

    Ok(Json(DataResponse { data: progress }))
}

// ---------------------------------------------------------------------------
// Admin endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/training
///
/// The full catalog across companies, inactive videos included.
pub async fn list_videos(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<TrainingVideo>>>> {
    let videos = TrainingRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: videos }))
}

/// POST /api/v1/admin/training
///
/// Add a video to the catalog. `company_id` null means globally visible.
pub async fn create_video(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateTrainingVideo>,
) -> AppResult<impl IntoResponse> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title must not be empty".into(),
        )));
    }
    if input.video_url.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Video URL must not be empty".into(),
        )));
    }

    let video = TrainingRepo::create_video(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: video })))
}

/// PUT /api/v1/admin/training/{id}
///
/// Update catalog metadata, ordering or the active flag.
pub async fn update_video(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTrainingVideo>,
) -> AppResult<Json<DataResponse<TrainingVideo>>> {
    let video = TrainingRepo::update_video(&state.pool, id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "TrainingVideo",
                id,
            })
        })?;
    Ok(Json(DataResponse { data: video }))
}
