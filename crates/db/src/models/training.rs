//! Training video and watch-progress entity models and DTOs.

use clarity_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A training video row from the `training_videos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrainingVideo {
    pub id: DbId,
    /// `None` means the video belongs to the global catalog and is visible
    /// to every company.
    pub company_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub duration_secs: Option<i32>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new training video.
#[derive(Debug, Deserialize)]
pub struct CreateTrainingVideo {
    pub company_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub duration_secs: Option<i32>,
    pub sort_order: Option<i32>,
}

/// DTO for updating a training video. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTrainingVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub duration_secs: Option<i32>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// A watch-progress row from the `training_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrainingProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub video_id: DbId,
    pub watched_secs: i32,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
