//! Route definitions for the platform-admin surface under `/admin`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{companies, journey, training, users};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                     -> list_users
/// POST   /users                     -> create_user
/// GET    /users/{id}                -> get_user
/// PUT    /users/{id}                -> update_user
/// DELETE /users/{id}                -> deactivate_user
/// POST   /users/{id}/reset-password -> reset_password
///
/// GET    /companies                 -> list_companies
/// PUT    /companies/{id}            -> update_company
/// DELETE /companies/{id}            -> deactivate_company
///
/// PUT    /journeys/{user_id}/result -> upload_result
///
/// GET    /training                  -> list_videos
/// POST   /training                  -> create_video
/// PUT    /training/{id}             -> update_video
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::deactivate_user),
        )
        .route("/users/{id}/reset-password", post(users::reset_password))
        .route("/companies", get(companies::list_companies))
        .route(
            "/companies/{id}",
            put(companies::update_company).delete(companies::deactivate_company),
        )
        .route("/journeys/{user_id}/result", put(journey::upload_result))
        .route(
            "/training",
            get(training::list_videos).post(training::create_video),
        )
        .route("/training/{id}", put(training::update_video))
}
