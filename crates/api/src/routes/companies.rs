//! Route definitions for the `/companies` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::companies;
use crate::state::AppState;

/// Routes mounted at `/companies`.
///
/// ```text
/// POST /register -> register_company (public)
/// GET  /me       -> my_company (manager)
/// PUT  /me       -> update_my_company (manager)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(companies::register_company))
        .route(
            "/me",
            get(companies::my_company).put(companies::update_my_company),
        )
}
