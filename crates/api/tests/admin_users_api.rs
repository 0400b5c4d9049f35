//! HTTP-level integration tests for platform-admin user management.

mod common;

use axum::http::StatusCode;
use clarity_db::repositories::RoleRepo;
use common::{
    body_json, delete_auth, get_auth, post_json, post_json_auth, put_json_auth,
    seed_company_fixture, seed_user,
};
use sqlx::PgPool;

const STRONG_PASSWORD: &str = "a long enough password";

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Admins create users of every role; company pairing follows the role.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_users_of_each_role(pool: PgPool) {
    let fixture = seed_company_fixture(&pool, "au-new").await;
    seed_user(&pool, None, "admin", "root@platform.example", None).await;
    let app = common::build_test_app(pool);
    let admin = common::login(app.clone(), "root@platform.example").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/users",
        &admin,
        serde_json::json!({
            "email": "second-admin@platform.example",
            "display_name": "Second Admin",
            "password": STRONG_PASSWORD,
            "role": "admin",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "admin");
    assert!(json["data"]["company_id"].is_null());

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/users",
        &admin,
        serde_json::json!({
            "email": "lead@au-new.example",
            "display_name": "New Manager",
            "password": STRONG_PASSWORD,
            "role": "manager",
            "company_id": fixture.company_id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "manager");
    assert_eq!(json["data"]["company_id"], fixture.company_id);

    // The fresh account can sign in right away.
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "lead@au-new.example", "password": STRONG_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Role and company must agree: admins carry none, everyone else needs one.
#[sqlx::test(migrations = "../../db/migrations")]
async fn create_user_enforces_role_company_pairing(pool: PgPool) {
    let fixture = seed_company_fixture(&pool, "au-pair").await;
    seed_user(&pool, None, "admin", "root@platform.example", None).await;
    let app = common::build_test_app(pool);
    let admin = common::login(app.clone(), "root@platform.example").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/users",
        &admin,
        serde_json::json!({
            "email": "odd@platform.example",
            "display_name": "Odd",
            "password": STRONG_PASSWORD,
            "role": "admin",
            "company_id": fixture.company_id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/users",
        &admin,
        serde_json::json!({
            "email": "stray@au-pair.example",
            "display_name": "Stray",
            "password": STRONG_PASSWORD,
            "role": "employee",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app,
        "/api/v1/admin/users",
        &admin,
        serde_json::json!({
            "email": "who@au-pair.example",
            "display_name": "Who",
            "password": STRONG_PASSWORD,
            "role": "superuser",
            "company_id": fixture.company_id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Email format, password strength and email uniqueness are enforced.
#[sqlx::test(migrations = "../../db/migrations")]
async fn create_user_validates_credentials(pool: PgPool) {
    let fixture = seed_company_fixture(&pool, "au-val").await;
    seed_user(&pool, None, "admin", "root@platform.example", None).await;
    let app = common::build_test_app(pool);
    let admin = common::login(app.clone(), "root@platform.example").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/users",
        &admin,
        serde_json::json!({
            "email": "not-an-email",
            "display_name": "X",
            "password": STRONG_PASSWORD,
            "role": "employee",
            "company_id": fixture.company_id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/users",
        &admin,
        serde_json::json!({
            "email": "new@au-val.example",
            "display_name": "X",
            "password": "short",
            "role": "employee",
            "company_id": fixture.company_id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The fixture manager's address is taken.
    let response = post_json_auth(
        app,
        "/api/v1/admin/users",
        &admin,
        serde_json::json!({
            "email": "manager@au-val.example",
            "display_name": "Clone",
            "password": STRONG_PASSWORD,
            "role": "employee",
            "company_id": fixture.company_id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Listing + reading
// ---------------------------------------------------------------------------

/// The user list spans companies and filters by company and role name.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_lists_and_filters_users(pool: PgPool) {
    let alpha = seed_company_fixture(&pool, "au-la").await;
    seed_company_fixture(&pool, "au-lb").await;
    seed_user(&pool, None, "admin", "root@platform.example", None).await;
    let app = common::build_test_app(pool);
    let admin = common::login(app.clone(), "root@platform.example").await;

    let response = get_auth(app.clone(), "/api/v1/admin/users", &admin).await;
    let json = body_json(response).await;
    // Two fixtures of two users each, plus the admin.
    assert_eq!(json["data"].as_array().expect("user array").len(), 5);

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/admin/users?company_id={}", alpha.company_id),
        &admin,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().expect("user array").len(), 2);

    let response = get_auth(app.clone(), "/api/v1/admin/users?role=manager", &admin).await;
    let json = body_json(response).await;
    let managers = json["data"].as_array().expect("user array");
    assert_eq!(managers.len(), 2);
    assert!(managers.iter().all(|u| u["role"] == "manager"));

    let response = get_auth(
        app.clone(),
        &format!(
            "/api/v1/admin/users?company_id={}&role=employee",
            alpha.company_id
        ),
        &admin,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().expect("user array").len(), 1);

    let response = get_auth(app, "/api/v1/admin/users?role=wizard", &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Update + deactivate + password reset
// ---------------------------------------------------------------------------

/// Admins update any user, including role changes that managers cannot
/// make.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_updates_user_and_role(pool: PgPool) {
    let fixture = seed_company_fixture(&pool, "au-edit").await;
    seed_user(&pool, None, "admin", "root@platform.example", None).await;
    let manager_role = RoleRepo::find_by_name(&pool, "manager")
        .await
        .expect("query role")
        .expect("seeded role");
    let app = common::build_test_app(pool);
    let admin = common::login(app.clone(), "root@platform.example").await;
    let uri = format!("/api/v1/admin/users/{}", fixture.employee.id);

    let response = put_json_auth(
        app.clone(),
        &uri,
        &admin,
        serde_json::json!({ "display_name": "Promoted", "role_id": manager_role.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["display_name"], "Promoted");
    assert_eq!(json["data"]["role"], "manager");

    let response = put_json_auth(
        app.clone(),
        &uri,
        &admin,
        serde_json::json!({ "role_id": 999999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(app.clone(), "/api/v1/admin/users/999999", &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get_auth(app, &uri, &admin).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_active"], false);
}

/// A password reset invalidates the old password immediately.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_resets_a_password(pool: PgPool) {
    let fixture = seed_company_fixture(&pool, "au-pw").await;
    seed_user(&pool, None, "admin", "root@platform.example", None).await;
    let app = common::build_test_app(pool);
    let admin = common::login(app.clone(), "root@platform.example").await;
    let uri = format!("/api/v1/admin/users/{}/reset-password", fixture.employee.id);

    let response = post_json_auth(
        app.clone(),
        &uri,
        &admin,
        serde_json::json!({ "new_password": "short" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        &uri,
        &admin,
        serde_json::json!({ "new_password": "an entirely new passphrase" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        serde_json::json!({
            "email": "employee@au-pw.example",
            "password": common::TEST_PASSWORD,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({
            "email": "employee@au-pw.example",
            "password": "an entirely new passphrase",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// The whole surface is closed to managers.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_user_routes_are_admin_only(pool: PgPool) {
    seed_company_fixture(&pool, "au-role").await;
    let app = common::build_test_app(pool);
    let manager = common::login(app.clone(), "manager@au-role.example").await;

    let response = get_auth(app.clone(), "/api/v1/admin/users", &manager).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = post_json_auth(
        app,
        "/api/v1/admin/users",
        &manager,
        serde_json::json!({
            "email": "x@au-role.example",
            "display_name": "X",
            "password": STRONG_PASSWORD,
            "role": "employee",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
