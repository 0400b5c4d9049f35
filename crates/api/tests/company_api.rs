//! HTTP-level integration tests for company registration and management.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json, put_json_auth, seed_company_fixture, seed_user,
};
use sqlx::PgPool;

fn registration(company: &str, slug: Option<&str>, email: &str) -> serde_json::Value {
    serde_json::json!({
        "company_name": company,
        "slug": slug,
        "email": email,
        "display_name": "Founding Manager",
        "password": "a long enough password",
    })
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Registering creates the company plus a signed-in manager account.
#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_company_and_manager(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_json(
        app,
        "/api/v1/companies/register",
        registration("Acme Corp", Some("acme"), "founder@acme.example"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["company"]["name"], "Acme Corp");
    assert_eq!(json["company"]["slug"], "acme");
    assert_eq!(json["auth"]["user"]["role"], "manager");
    assert!(json["auth"]["access_token"].is_string());

    // The manager row exists and is scoped to the new company.
    let user = clarity_db::repositories::UserRepo::find_by_email(&pool, "founder@acme.example")
        .await
        .unwrap()
        .expect("manager account must exist");
    assert_eq!(user.company_id, json["company"]["id"].as_i64());
}

/// When no slug is given, one is derived from the company name.
#[sqlx::test(migrations = "../../db/migrations")]
async fn register_derives_slug_from_name(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/companies/register",
        registration("North & South Ltd", None, "founder@ns.example"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["company"]["slug"], "north-south-ltd");
}

/// A taken slug is a 409, not a 500.
#[sqlx::test(migrations = "../../db/migrations")]
async fn register_duplicate_slug_conflicts(pool: PgPool) {
    common::seed_company(&pool, "First Mover", "movers").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/companies/register",
        registration("Second Mover", Some("movers"), "late@movers.example"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// An email already attached to an account cannot found a second company.
#[sqlx::test(migrations = "../../db/migrations")]
async fn register_duplicate_email_conflicts(pool: PgPool) {
    seed_company_fixture(&pool, "taken-co").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/companies/register",
        registration("Other Co", Some("other"), "manager@taken-co.example"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Uppercase slugs and short passwords are validation errors.
#[sqlx::test(migrations = "../../db/migrations")]
async fn register_validates_inputs(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/companies/register",
        registration("CapsCo", Some("Caps-Co"), "caps@caps.example"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut weak = registration("WeakCo", Some("weak"), "weak@weak.example");
    weak["password"] = serde_json::json!("short");
    let response = post_json(app, "/api/v1/companies/register", weak).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Manager: own company
// ---------------------------------------------------------------------------

/// A manager sees and renames their own company, never anyone else's.
#[sqlx::test(migrations = "../../db/migrations")]
async fn manager_reads_and_renames_own_company(pool: PgPool) {
    let fixture = seed_company_fixture(&pool, "rename-co").await;
    let app = common::build_test_app(pool);
    let token = common::login(app.clone(), "manager@rename-co.example").await;

    let response = get_auth(app.clone(), "/api/v1/companies/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], fixture.company_id);

    let response = put_json_auth(
        app.clone(),
        "/api/v1/companies/me",
        &token,
        serde_json::json!({ "name": "Renamed Inc" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Renamed Inc");
    // The slug is permanent.
    assert_eq!(json["data"]["slug"], "rename-co");
}

/// Renaming to an empty string is rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn rename_to_empty_is_rejected(pool: PgPool) {
    seed_company_fixture(&pool, "empty-co").await;
    let app = common::build_test_app(pool);
    let token = common::login(app.clone(), "manager@empty-co.example").await;

    let response = put_json_auth(
        app,
        "/api/v1/companies/me",
        &token,
        serde_json::json!({ "name": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Admin CRUD
// ---------------------------------------------------------------------------

/// Admin listing shows every company, including deactivated ones.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_lists_and_deactivates_companies(pool: PgPool) {
    let fixture = seed_company_fixture(&pool, "admin-co").await;
    seed_user(&pool, None, "admin", "root@platform.example", None).await;
    let app = common::build_test_app(pool);
    let token = common::login(app.clone(), "root@platform.example").await;

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/admin/companies/{}", fixture.company_id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), "/api/v1/admin/companies", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let listed = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == fixture.company_id)
        .expect("deactivated company still listed for admins");
    assert_eq!(listed["is_active"], false);

    // Reactivation goes through the same update endpoint.
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/companies/{}", fixture.company_id),
        &token,
        serde_json::json!({ "is_active": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_active"], true);
}

/// The admin company surface is closed to managers.
#[sqlx::test(migrations = "../../db/migrations")]
async fn manager_cannot_use_admin_company_routes(pool: PgPool) {
    seed_company_fixture(&pool, "closed-co").await;
    let app = common::build_test_app(pool);
    let token = common::login(app.clone(), "manager@closed-co.example").await;

    let response = get_auth(app, "/api/v1/admin/companies", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
