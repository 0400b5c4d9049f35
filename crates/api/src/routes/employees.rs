//! Route definitions for the manager dashboard under `/employees`.

use axum::routing::get;
use axum::Router;

use crate::handlers::employees;
use crate::state::AppState;

/// Routes mounted at `/employees`. All require the manager role and are
/// scoped to the manager's own company.
///
/// ```text
/// GET    /      -> list_employees (?stage=, ?search=)
/// GET    /{id}  -> get_employee
/// PUT    /{id}  -> update_employee
/// DELETE /{id}  -> deactivate_employee
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(employees::list_employees))
        .route(
            "/{id}",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::deactivate_employee),
        )
}
