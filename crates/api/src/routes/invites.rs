//! Route definitions for the `/invites` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::invites;
use crate::state::AppState;

/// Routes mounted at `/invites`.
///
/// The lookup and accept endpoints are public; the invite token itself is
/// the credential.
///
/// ```text
/// POST   /        -> create_invite (manager)
/// GET    /        -> list_invites (manager)
/// DELETE /{id}    -> revoke_invite (manager)
/// GET    /lookup  -> lookup_invite (public, ?token=)
/// POST   /accept  -> accept_invite (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(invites::create_invite).get(invites::list_invites))
        .route("/lookup", get(invites::lookup_invite))
        .route("/accept", post(invites::accept_invite))
        .route("/{id}", axum::routing::delete(invites::revoke_invite))
}
