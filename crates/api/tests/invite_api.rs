//! HTTP-level integration tests for the invite lifecycle: create, list,
//! lookup, accept, revoke, and every way a token can be dead.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json, post_json_auth, seed_company_fixture, seed_user,
};
use sqlx::PgPool;

/// Create an invite via the API, returning (invite id, plaintext token).
async fn create_invite(app: axum::Router, token: &str, email: &str) -> (i64, String) {
    let response = post_json_auth(
        app,
        "/api/v1/invites",
        token,
        serde_json::json!({ "email": email }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["invite"]["id"].as_i64().unwrap();
    let plaintext = json["token"].as_str().unwrap().to_string();
    (id, plaintext)
}

fn acceptance(token: &str) -> serde_json::Value {
    serde_json::json!({
        "token": token,
        "display_name": "New Hire",
        "password": "a long enough password",
    })
}

// ---------------------------------------------------------------------------
// Create + list
// ---------------------------------------------------------------------------

/// Creating an invite returns the plaintext token exactly once; the
/// listing afterwards only shows the prefix.
#[sqlx::test(migrations = "../../db/migrations")]
async fn create_returns_token_once_list_shows_prefix(pool: PgPool) {
    seed_company_fixture(&pool, "invite-co").await;
    let app = common::build_test_app(pool);
    let manager = common::login(app.clone(), "manager@invite-co.example").await;

    let (_id, plaintext) = create_invite(app.clone(), &manager, "newhire@invite-co.example").await;
    assert_eq!(plaintext.len(), 48, "token should be 48 characters");

    let response = get_auth(app, "/api/v1/invites", &manager).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let invites = json["data"].as_array().unwrap();
    assert_eq!(invites.len(), 1);
    assert_eq!(invites[0]["email"], "newhire@invite-co.example");
    assert_eq!(invites[0]["role"], "employee");
    let prefix = invites[0]["token_prefix"].as_str().unwrap();
    assert!(plaintext.starts_with(prefix));
    assert!(
        invites[0].get("token").is_none() && invites[0].get("token_hash").is_none(),
        "neither plaintext nor hash may appear in listings"
    );
}

/// Inviting an existing account is a 409.
#[sqlx::test(migrations = "../../db/migrations")]
async fn invite_for_existing_user_conflicts(pool: PgPool) {
    seed_company_fixture(&pool, "exists-co").await;
    let app = common::build_test_app(pool);
    let manager = common::login(app.clone(), "manager@exists-co.example").await;

    let response = post_json_auth(
        app,
        "/api/v1/invites",
        &manager,
        serde_json::json!({ "email": "employee@exists-co.example" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Two pending invites for the same email in one company is a 409
/// (enforced by a partial unique index).
#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_pending_invite_conflicts(pool: PgPool) {
    seed_company_fixture(&pool, "dup-co").await;
    let app = common::build_test_app(pool);
    let manager = common::login(app.clone(), "manager@dup-co.example").await;

    create_invite(app.clone(), &manager, "twice@dup-co.example").await;
    let response = post_json_auth(
        app,
        "/api/v1/invites",
        &manager,
        serde_json::json!({ "email": "twice@dup-co.example" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Lookup resolves a valid token to email + company for the signup page.
#[sqlx::test(migrations = "../../db/migrations")]
async fn lookup_resolves_valid_token(pool: PgPool) {
    seed_company_fixture(&pool, "lookup-co").await;
    let app = common::build_test_app(pool);
    let manager = common::login(app.clone(), "manager@lookup-co.example").await;
    let (_id, plaintext) = create_invite(app.clone(), &manager, "vis@lookup-co.example").await;

    let response = common::get(
        app,
        &format!("/api/v1/invites/lookup?token={plaintext}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "vis@lookup-co.example");
    assert_eq!(json["data"]["company_name"], "lookup-co inc");
}

/// A token that never existed is a 400, indistinguishable from revoked.
#[sqlx::test(migrations = "../../db/migrations")]
async fn lookup_unknown_token_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(app, "/api/v1/invites/lookup?token=nonsense").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Accept
// ---------------------------------------------------------------------------

/// Accepting creates the employee under the inviting manager, starts
/// their journey record, and signs them in.
#[sqlx::test(migrations = "../../db/migrations")]
async fn accept_creates_employee_and_signs_in(pool: PgPool) {
    let fixture = seed_company_fixture(&pool, "accept-co").await;
    let app = common::build_test_app(pool.clone());
    let manager = common::login(app.clone(), "manager@accept-co.example").await;
    let (_id, plaintext) = create_invite(app.clone(), &manager, "hire@accept-co.example").await;

    let response = post_json(app.clone(), "/api/v1/invites/accept", acceptance(&plaintext)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["user"]["role"], "employee");
    assert_eq!(json["user"]["email"], "hire@accept-co.example");
    assert!(json["access_token"].is_string());

    let user = clarity_db::repositories::UserRepo::find_by_email(&pool, "hire@accept-co.example")
        .await
        .unwrap()
        .expect("employee account must exist");
    assert_eq!(user.company_id, Some(fixture.company_id));
    assert_eq!(user.manager_id, Some(fixture.manager.id));

    // The journey record exists, unfilled.
    let journey = clarity_db::repositories::JourneyRepo::find_by_user_id(&pool, user.id)
        .await
        .unwrap()
        .expect("journey record must exist");
    assert!(!journey.filled);

    // The new employee can use their token right away.
    let token = json["access_token"].as_str().unwrap();
    let me = get_auth(app, "/api/v1/me/journey", token).await;
    assert_eq!(me.status(), StatusCode::OK);
}

/// A token can be accepted only once; the second attempt is a 409.
#[sqlx::test(migrations = "../../db/migrations")]
async fn accept_twice_conflicts(pool: PgPool) {
    seed_company_fixture(&pool, "twice-co").await;
    let app = common::build_test_app(pool);
    let manager = common::login(app.clone(), "manager@twice-co.example").await;
    let (_id, plaintext) = create_invite(app.clone(), &manager, "once@twice-co.example").await;

    let response = post_json(app.clone(), "/api/v1/invites/accept", acceptance(&plaintext)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(app, "/api/v1/invites/accept", acceptance(&plaintext)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// A revoked token cannot be looked up or accepted.
#[sqlx::test(migrations = "../../db/migrations")]
async fn revoked_token_is_dead(pool: PgPool) {
    seed_company_fixture(&pool, "revoke-co").await;
    let app = common::build_test_app(pool);
    let manager = common::login(app.clone(), "manager@revoke-co.example").await;
    let (id, plaintext) = create_invite(app.clone(), &manager, "gone@revoke-co.example").await;

    let response = delete_auth(app.clone(), &format!("/api/v1/invites/{id}"), &manager).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = common::get(
        app.clone(),
        &format!("/api/v1/invites/lookup?token={plaintext}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(app, "/api/v1/invites/accept", acceptance(&plaintext)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// An expired token is rejected with 400.
#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_token_is_rejected(pool: PgPool) {
    seed_company_fixture(&pool, "expired-co").await;
    let app = common::build_test_app(pool.clone());
    let manager = common::login(app.clone(), "manager@expired-co.example").await;
    let (id, plaintext) = create_invite(app.clone(), &manager, "late@expired-co.example").await;

    // Backdate the expiry.
    sqlx::query("UPDATE invites SET expires_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let response = post_json(app, "/api/v1/invites/accept", acceptance(&plaintext)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Accepting into a deactivated company is a 403.
#[sqlx::test(migrations = "../../db/migrations")]
async fn accept_into_deactivated_company_is_forbidden(pool: PgPool) {
    let fixture = seed_company_fixture(&pool, "dead-co").await;
    let app = common::build_test_app(pool.clone());
    let manager = common::login(app.clone(), "manager@dead-co.example").await;
    let (_id, plaintext) = create_invite(app.clone(), &manager, "in@dead-co.example").await;

    clarity_db::repositories::CompanyRepo::deactivate(&pool, fixture.company_id)
        .await
        .unwrap();

    let response = post_json(app, "/api/v1/invites/accept", acceptance(&plaintext)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A weak password fails acceptance and leaves the invite reusable.
#[sqlx::test(migrations = "../../db/migrations")]
async fn weak_password_leaves_invite_pending(pool: PgPool) {
    seed_company_fixture(&pool, "weak-co").await;
    let app = common::build_test_app(pool);
    let manager = common::login(app.clone(), "manager@weak-co.example").await;
    let (_id, plaintext) = create_invite(app.clone(), &manager, "weak@weak-co.example").await;

    let mut body = acceptance(&plaintext);
    body["password"] = serde_json::json!("short");
    let response = post_json(app.clone(), "/api/v1/invites/accept", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The same token still works with a proper password.
    let response = post_json(app, "/api/v1/invites/accept", acceptance(&plaintext)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// Tenant isolation
// ---------------------------------------------------------------------------

/// A manager can neither see nor revoke another company's invites.
#[sqlx::test(migrations = "../../db/migrations")]
async fn invites_are_tenant_scoped(pool: PgPool) {
    seed_company_fixture(&pool, "alpha-co").await;
    let beta = common::seed_company(&pool, "beta inc", "beta-co").await;
    seed_user(&pool, Some(beta), "manager", "manager@beta-co.example", None).await;

    let app = common::build_test_app(pool);
    let alpha_manager = common::login(app.clone(), "manager@alpha-co.example").await;
    let beta_manager = common::login(app.clone(), "manager@beta-co.example").await;

    let (id, _plaintext) =
        create_invite(app.clone(), &alpha_manager, "only@alpha-co.example").await;

    let response = get_auth(app.clone(), "/api/v1/invites", &beta_manager).await;
    let json = body_json(response).await;
    assert!(
        json["data"].as_array().unwrap().is_empty(),
        "beta's manager must not see alpha's invites"
    );

    let response = delete_auth(app, &format!("/api/v1/invites/{id}"), &beta_manager).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Employees cannot mint invites.
#[sqlx::test(migrations = "../../db/migrations")]
async fn employees_cannot_create_invites(pool: PgPool) {
    seed_company_fixture(&pool, "nomint-co").await;
    let app = common::build_test_app(pool);
    let token = common::login(app.clone(), "employee@nomint-co.example").await;

    let response = post_json_auth(
        app,
        "/api/v1/invites",
        &token,
        serde_json::json!({ "email": "friend@nomint-co.example" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
