//! Integration tests for the training catalog and watch progress.

use chrono::{SubsecRound, Utc};
use clarity_core::roles::ROLE_EMPLOYEE;
use sqlx::PgPool;

use clarity_db::models::company::CreateCompany;
use clarity_db::models::training::{CreateTrainingVideo, UpdateTrainingVideo};
use clarity_db::models::user::CreateUser;
use clarity_db::repositories::{CompanyRepo, RoleRepo, TrainingRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_company(pool: &PgPool, slug: &str) -> i64 {
    CompanyRepo::create(
        pool,
        &CreateCompany {
            name: slug.to_uppercase(),
            slug: slug.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_employee(pool: &PgPool, company_id: i64, email: &str) -> i64 {
    let role = RoleRepo::find_by_name(pool, ROLE_EMPLOYEE)
        .await
        .unwrap()
        .unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            company_id: Some(company_id),
            role_id: role.id,
            manager_id: None,
            email: email.to_string(),
            display_name: email.split('@').next().unwrap().to_string(),
            password_hash: "$argon2id$test-hash".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn new_video(company_id: Option<i64>, title: &str, sort_order: i32) -> CreateTrainingVideo {
    CreateTrainingVideo {
        company_id,
        title: title.to_string(),
        description: None,
        video_url: format!("https://videos.test/{title}.mp4"),
        duration_secs: Some(300),
        sort_order: Some(sort_order),
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_catalog_merges_global_and_company_videos(pool: PgPool) {
    let acme = seed_company(&pool, "acme").await;
    let globex = seed_company(&pool, "globex").await;

    TrainingRepo::create_video(&pool, &new_video(None, "welcome", 0))
        .await
        .unwrap();
    TrainingRepo::create_video(&pool, &new_video(Some(acme), "acme-only", 1))
        .await
        .unwrap();
    TrainingRepo::create_video(&pool, &new_video(Some(globex), "globex-only", 1))
        .await
        .unwrap();

    let acme_catalog = TrainingRepo::list_for_company(&pool, acme).await.unwrap();
    let titles: Vec<&str> = acme_catalog.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(titles, vec!["welcome", "acme-only"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_catalog_hides_deactivated_videos(pool: PgPool) {
    let acme = seed_company(&pool, "acme").await;
    let video = TrainingRepo::create_video(&pool, &new_video(Some(acme), "old-intro", 0))
        .await
        .unwrap();

    TrainingRepo::update_video(
        &pool,
        video.id,
        &UpdateTrainingVideo {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let catalog = TrainingRepo::list_for_company(&pool, acme).await.unwrap();
    assert!(catalog.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_catalog_respects_sort_order(pool: PgPool) {
    let acme = seed_company(&pool, "acme").await;
    TrainingRepo::create_video(&pool, &new_video(Some(acme), "third", 30))
        .await
        .unwrap();
    TrainingRepo::create_video(&pool, &new_video(Some(acme), "first", 10))
        .await
        .unwrap();
    TrainingRepo::create_video(&pool, &new_video(Some(acme), "second", 20))
        .await
        .unwrap();

    let catalog = TrainingRepo::list_for_company(&pool, acme).await.unwrap();
    let titles: Vec<&str> = catalog.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second", "third"]);
}

// ---------------------------------------------------------------------------
// Watch progress
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_progress_never_moves_backwards(pool: PgPool) {
    let acme = seed_company(&pool, "acme").await;
    let user_id = seed_employee(&pool, acme, "eli@acme.test").await;
    let video = TrainingRepo::create_video(&pool, &new_video(Some(acme), "intro", 0))
        .await
        .unwrap();

    TrainingRepo::upsert_progress(&pool, user_id, video.id, 120, None)
        .await
        .unwrap();
    // A stale report from a second tab must not rewind the position.
    let after_stale = TrainingRepo::upsert_progress(&pool, user_id, video.id, 45, None)
        .await
        .unwrap();
    assert_eq!(after_stale.watched_secs, 120);

    let advanced = TrainingRepo::upsert_progress(&pool, user_id, video.id, 250, None)
        .await
        .unwrap();
    assert_eq!(advanced.watched_secs, 250);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_completion_timestamp_is_sticky(pool: PgPool) {
    let acme = seed_company(&pool, "acme").await;
    let user_id = seed_employee(&pool, acme, "eli@acme.test").await;
    let video = TrainingRepo::create_video(&pool, &new_video(Some(acme), "intro", 0))
        .await
        .unwrap();

    // Whole microseconds so the instant round-trips through timestamptz.
    let completed_at = Utc::now().trunc_subsecs(6);
    let first = TrainingRepo::upsert_progress(&pool, user_id, video.id, 300, Some(completed_at))
        .await
        .unwrap();
    assert_eq!(first.completed_at, Some(completed_at));

    // Re-watching keeps the original completion time.
    let rewatch = TrainingRepo::upsert_progress(&pool, user_id, video.id, 300, Some(Utc::now()))
        .await
        .unwrap();
    assert_eq!(rewatch.completed_at, Some(completed_at));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_progress_listing_covers_all_watched_videos(pool: PgPool) {
    let acme = seed_company(&pool, "acme").await;
    let user_id = seed_employee(&pool, acme, "eli@acme.test").await;
    let a = TrainingRepo::create_video(&pool, &new_video(Some(acme), "a", 0))
        .await
        .unwrap();
    let b = TrainingRepo::create_video(&pool, &new_video(Some(acme), "b", 1))
        .await
        .unwrap();

    TrainingRepo::upsert_progress(&pool, user_id, a.id, 10, None)
        .await
        .unwrap();
    TrainingRepo::upsert_progress(&pool, user_id, b.id, 20, None)
        .await
        .unwrap();

    let progress = TrainingRepo::progress_for_user(&pool, user_id).await.unwrap();
    assert_eq!(progress.len(), 2);
}
