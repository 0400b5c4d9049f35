//! Repository for the `training_videos` and `training_progress` tables.

use clarity_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::training::{
    CreateTrainingVideo, TrainingProgress, TrainingVideo, UpdateTrainingVideo,
};

/// Column list for `training_videos` queries.
const VIDEO_COLUMNS: &str = "id, company_id, title, description, video_url, duration_secs, \
                              sort_order, is_active, created_at, updated_at";

/// Column list for `training_progress` queries.
const PROGRESS_COLUMNS: &str =
    "id, user_id, video_id, watched_secs, completed_at, created_at, updated_at";

/// Provides operations for training videos and per-user watch progress.
pub struct TrainingRepo;

impl TrainingRepo {
    /// Insert a new training video, returning the created row.
    pub async fn create_video(
        pool: &PgPool,
        input: &CreateTrainingVideo,
    ) -> Result<TrainingVideo, sqlx::Error> {
        let query = format!(
            "INSERT INTO training_videos
                (company_id, title, description, video_url, duration_secs, sort_order)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0))
             RETURNING {VIDEO_COLUMNS}"
        );
        sqlx::query_as::<_, TrainingVideo>(&query)
            .bind(input.company_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.video_url)
            .bind(input.duration_secs)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Find a video by internal ID.
    pub async fn find_video(pool: &PgPool, id: DbId) -> Result<Option<TrainingVideo>, sqlx::Error> {
        let query = format!("SELECT {VIDEO_COLUMNS} FROM training_videos WHERE id = $1");
        sqlx::query_as::<_, TrainingVideo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The active catalog visible to a company: global videos plus the
    /// company's own, in curriculum order.
    pub async fn list_for_company(
        pool: &PgPool,
        company_id: DbId,
    ) -> Result<Vec<TrainingVideo>, sqlx::Error> {
        let query = format!(
            "SELECT {VIDEO_COLUMNS} FROM training_videos
             WHERE (company_id IS NULL OR company_id = $1) AND is_active = true
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, TrainingVideo>(&query)
            .bind(company_id)
            .fetch_all(pool)
            .await
    }

    /// The full catalog across all companies, inactive videos included.
    /// Admin view.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<TrainingVideo>, sqlx::Error> {
        let query = format!(
            "SELECT {VIDEO_COLUMNS} FROM training_videos ORDER BY company_id NULLS FIRST, sort_order, id"
        );
        sqlx::query_as::<_, TrainingVideo>(&query).fetch_all(pool).await
    }

    /// Update a video. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_video(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTrainingVideo,
    ) -> Result<Option<TrainingVideo>, sqlx::Error> {
        let query = format!(
            "UPDATE training_videos SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                video_url = COALESCE($4, video_url),
                duration_secs = COALESCE($5, duration_secs),
                sort_order = COALESCE($6, sort_order),
                is_active = COALESCE($7, is_active)
             WHERE id = $1
             RETURNING {VIDEO_COLUMNS}"
        );
        sqlx::query_as::<_, TrainingVideo>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.video_url)
            .bind(input.duration_secs)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Record watch progress for `(user, video)`.
    ///
    /// `watched_secs` is monotone: a stale report from a second tab can
    /// never move progress backwards. A completion instant, once set, is
    /// kept.
    pub async fn upsert_progress(
        pool: &PgPool,
        user_id: DbId,
        video_id: DbId,
        watched_secs: i32,
        completed_at: Option<Timestamp>,
    ) -> Result<TrainingProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO training_progress (user_id, video_id, watched_secs, completed_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, video_id)
             DO UPDATE SET
                watched_secs = GREATEST(training_progress.watched_secs, EXCLUDED.watched_secs),
                completed_at = COALESCE(training_progress.completed_at, EXCLUDED.completed_at)
             RETURNING {PROGRESS_COLUMNS}"
        );
        sqlx::query_as::<_, TrainingProgress>(&query)
            .bind(user_id)
            .bind(video_id)
            .bind(watched_secs)
            .bind(completed_at)
            .fetch_one(pool)
            .await
    }

    /// All progress rows for a user.
    pub async fn progress_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<TrainingProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {PROGRESS_COLUMNS} FROM training_progress WHERE user_id = $1 ORDER BY video_id"
        );
        sqlx::query_as::<_, TrainingProgress>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
