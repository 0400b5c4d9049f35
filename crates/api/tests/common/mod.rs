#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use chrono::SubsecRound;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use clarity_core::clock::{Clock, FixedClock, SystemClock};
use clarity_core::types::DbId;
use clarity_db::models::user::{CreateUser, User};
use clarity_db::repositories::{RoleRepo, UserRepo};

use clarity_api::auth::jwt::JwtConfig;
use clarity_api::auth::password::hash_password;
use clarity_api::autosave::build_autosave;
use clarity_api::config::ServerConfig;
use clarity_api::routes;
use clarity_api::state::AppState;
use clarity_api::ws::WsManager;

/// Password used for every seeded account.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        journey_release_hours: 72,
        journey_release_override_secs: None,
        workbook_quiet_ms: 1_000,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and the real system clock.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_clock(pool, Arc::new(SystemClock))
}

/// Like [`build_test_app`], but with an injected clock so journey release
/// tests can move time instead of waiting 72 hours.
pub fn build_test_app_with_clock(pool: PgPool, clock: Arc<dyn Clock>) -> Router {
    let config = test_config();
    let ws_manager = Arc::new(WsManager::new());
    let event_bus = Arc::new(clarity_events::EventBus::default());
    let release_policy = config.release_policy();
    let autosave = build_autosave(pool.clone(), Arc::clone(&clock), config.workbook_quiet());

    let state = AppState {
        pool,
        config: Arc::new(config),
        ws_manager,
        event_bus,
        clock,
        release_policy,
        autosave,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// A fixed clock pinned to the current instant, for release-gate tests.
///
/// Pinned to whole microseconds so the instant survives a round-trip
/// through Postgres `timestamptz` columns unchanged.
pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at(chrono::Utc::now().trunc_subsecs(6)))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Read and parse a JSON response body.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!(
            "response body is not JSON: {e}: {}",
            String::from_utf8_lossy(&bytes)
        )
    })
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Insert a company directly and return its id.
pub async fn seed_company(pool: &PgPool, name: &str, slug: &str) -> DbId {
    let company = clarity_db::repositories::CompanyRepo::create(
        pool,
        &clarity_db::models::company::CreateCompany {
            name: name.to_string(),
            slug: slug.to_string(),
        },
    )
    .await
    .expect("company creation should succeed");
    company.id
}

/// Insert a user with the given role name, company and manager.
///
/// The password is always [`TEST_PASSWORD`].
pub async fn seed_user(
    pool: &PgPool,
    company_id: Option<DbId>,
    role_name: &str,
    email: &str,
    manager_id: Option<DbId>,
) -> User {
    let role = RoleRepo::find_by_name(pool, role_name)
        .await
        .expect("role lookup should succeed")
        .unwrap_or_else(|| panic!("role {role_name} missing from seed data"));
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UserRepo::create(
        pool,
        &CreateUser {
            company_id,
            role_id: role.id,
            manager_id,
            email: email.to_string(),
            display_name: email.split('@').next().unwrap_or(email).to_string(),
            password_hash,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// A seeded company with one manager and one employee reporting to them.
pub struct CompanyFixture {
    pub company_id: DbId,
    pub manager: User,
    pub employee: User,
}

/// Seed the usual tenant triangle used by most tests.
pub async fn seed_company_fixture(pool: &PgPool, slug: &str) -> CompanyFixture {
    let company_id = seed_company(pool, &format!("{slug} inc"), slug).await;
    let manager = seed_user(
        pool,
        Some(company_id),
        "manager",
        &format!("manager@{slug}.example"),
        None,
    )
    .await;
    let employee = seed_user(
        pool,
        Some(company_id),
        "employee",
        &format!("employee@{slug}.example"),
        Some(manager.id),
    )
    .await;
    CompanyFixture {
        company_id,
        manager,
        employee,
    }
}

/// Log a seeded user in via the API and return their access token.
pub async fn login(app: Router, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "login for {email} should succeed"
    );
    let json = body_json(response).await;
    json["access_token"]
        .as_str()
        .expect("login response must carry access_token")
        .to_string()
}
