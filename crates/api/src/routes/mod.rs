pub mod admin;
pub mod auth;
pub mod companies;
pub mod employees;
pub mod health;
pub mod invites;
pub mod me;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                WebSocket (?token=, journey countdown + toasts)
///
/// /auth/login                        login (public)
/// /auth/refresh                      refresh (public)
/// /auth/logout                       logout (requires auth)
///
/// /companies/register                company + first manager signup (public)
/// /companies/me                      own company get, rename (manager)
///
/// /invites                           create, list (manager)
/// /invites/{id}                      revoke (manager)
/// /invites/lookup                    token lookup (public)
/// /invites/accept                    redeem token, create employee (public)
///
/// /me/journey                        journey snapshot (employee)
/// /me/journey/submit                 one-shot submission (employee)
/// /me/workbook                       full workbook view (employee)
/// /me/workbook/fields/{field_key}    debounced field save (employee)
/// /me/workbook/flush                 force-persist pending edits (employee)
/// /me/training                       catalog + own progress (employee)
/// /me/training/{video_id}/progress   update watch progress (employee)
///
/// /employees                         dashboard listing (manager, ?stage=, ?search=)
/// /employees/{id}                    get, update, deactivate (manager)
/// /activity                          recent company events (manager)
///
/// /admin/users                       list, create (admin)
/// /admin/users/{id}                  get, update, deactivate (admin)
/// /admin/users/{id}/reset-password   reset password (admin)
/// /admin/companies                   list (admin)
/// /admin/companies/{id}              update, deactivate (admin)
/// /admin/journeys/{user_id}/result   upload Journey Map document (admin)
/// /admin/training                    list, create (admin)
/// /admin/training/{id}               update (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint (countdown ticks + toasts).
        .route("/ws", get(ws::ws_handler))
        // Authentication routes (login, refresh, logout).
        .nest("/auth", auth::router())
        // Public registration + the manager's own company.
        .nest("/companies", companies::router())
        // Invite lifecycle; lookup/accept are public.
        .nest("/invites", invites::router())
        // Employee self-service: journey, workbook, training.
        .nest("/me", me::router())
        // Manager dashboard over the company's employees.
        .nest("/employees", employees::router())
        // Manager activity feed from the event trail.
        .route("/activity", get(handlers::events::company_activity))
        // Platform-admin surface.
        .nest("/admin", admin::router())
}
