//! Route definitions for the employee self-service surface under `/me`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{journey, training, workbook};
use crate::state::AppState;

/// Routes mounted at `/me`. All require the employee role.
///
/// ```text
/// GET  /journey                      -> my_journey
/// POST /journey/submit               -> submit_journey
/// GET  /workbook                     -> my_workbook
/// PUT  /workbook/fields/{field_key}  -> save_field
/// POST /workbook/flush               -> flush_workbook
/// GET  /training                     -> my_training
/// PUT  /training/{video_id}/progress -> update_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/journey", get(journey::my_journey))
        .route("/journey/submit", post(journey::submit_journey))
        .route("/workbook", get(workbook::my_workbook))
        .route("/workbook/fields/{field_key}", put(workbook::save_field))
        .route("/workbook/flush", post(workbook::flush_workbook))
        .route("/training", get(training::my_training))
        .route(
            "/training/{video_id}/progress",
            put(training::update_progress),
        )
}
