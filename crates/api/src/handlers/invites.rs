//! Handlers for the `/invites` resource.
//!
//! Managers mint invite tokens for employee email addresses; the invite
//! page looks a token up and accepts it without authentication. No email
//! is sent anywhere. The plaintext token is returned to the inviting
//! manager exactly once, and only its SHA-256 hash is stored.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use clarity_core::error::CoreError;
use clarity_core::invites::{
    default_expires_at, generate_invite_token, hash_invite_token, is_expired,
};
use clarity_core::roles::ROLE_EMPLOYEE;
use clarity_core::types::Timestamp;
use clarity_core::DbId;
use clarity_db::models::invite::{CreateInvite, Invite, InviteResponse};
use clarity_db::models::user::CreateUser;
use clarity_db::repositories::{CompanyRepo, InviteRepo, JourneyRepo, RoleRepo, UserRepo};

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::{create_auth_response, AuthResponse};
use crate::handlers::companies::validate_email;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /invites`.
#[derive(Debug, Deserialize)]
pub struct CreateInviteRequest {
    pub email: String,
}

/// Response body for `POST /invites`. Carries the plaintext token; it is
/// not retrievable afterwards.
#[derive(Debug, Serialize)]
pub struct InviteCreatedResponse {
    pub invite: InviteResponse,
    pub token: String,
}

/// Query parameters for `GET /invites/lookup`.
#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub token: String,
}

/// Response body for `GET /invites/lookup`.
#[derive(Debug, Serialize)]
pub struct InviteLookup {
    pub email: String,
    pub company_name: String,
    pub expires_at: Timestamp,
}

/// Request body for `POST /invites/accept`.
#[derive(Debug, Deserialize)]
pub struct AcceptInviteRequest {
    pub token: String,
    pub display_name: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Manager endpoints
// ---------------------------------------------------------------------------

/// POST /api/v1/invites
///
/// Create an invite for an email address within the manager's company.
/// Returns 201 with the plaintext token, shown exactly once.
pub async fn create_invite(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Json(input): Json<CreateInviteRequest>,
) -> AppResult<impl IntoResponse> {
    let company_id = manager.company_scope()?;
    validate_email(&input.email)?;
    let email = input.email.trim().to_string();

    // Someone with an account does not need an invite.
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "A user with this email already exists".into(),
        )));
    }

    let employee_role = RoleRepo::find_by_name(&state.pool, ROLE_EMPLOYEE)
        .await?
        .ok_or_else(|| AppError::InternalError("Role table is missing 'employee'".into()))?;

    let token = generate_invite_token();
    let now = state.clock.now();

    let invite = InviteRepo::create(
        &state.pool,
        &CreateInvite {
            company_id,
            invited_by: manager.user_id,
            email: email.clone(),
            role_id: employee_role.id,
            token_hash: token.hash,
            token_prefix: token.prefix,
            expires_at: default_expires_at(now),
        },
    )
    .await?;

    let event = clarity_events::PlatformEvent::new("invite.created")
        .with_company(company_id)
        .with_source("invite", invite.id)
        .with_actor(manager.user_id)
        .with_payload(serde_json::json!({ "email": email }));
    state.event_bus.publish(event);

    let response = InviteCreatedResponse {
        invite: to_invite_response(&invite, ROLE_EMPLOYEE),
        token: token.plaintext,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/invites
///
/// List all invites for the manager's company, newest first.
pub async fn list_invites(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
) -> AppResult<Json<DataResponse<Vec<InviteResponse>>>> {
    let company_id = manager.company_scope()?;
    let invites = InviteRepo::list_for_company(&state.pool, company_id).await?;

    // Resolve role names once, not per row.
    let roles: HashMap<DbId, String> = RoleRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();

    let data = invites
        .iter()
        .map(|invite| {
            let role = roles
                .get(&invite.role_id)
                .map(String::as_str)
                .unwrap_or("unknown");
            to_invite_response(invite, role)
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/invites/{id}
///
/// Revoke a pending invite. Returns 204 No Content.
pub async fn revoke_invite(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let company_id = manager.company_scope()?;

    let invite = InviteRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|invite| invite.company_id == company_id)
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Invite", id }))?;

    if invite.accepted_at.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Invite has already been accepted".into(),
        )));
    }

    let revoked = InviteRepo::revoke(&state.pool, id, state.clock.now()).await?;
    if !revoked {
        return Err(AppError::Core(CoreError::Conflict(
            "Invite is no longer pending".into(),
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Public endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/invites/lookup?token=...
///
/// Resolve an invite token to the email and company it was minted for,
/// so the signup page can prefill. Public.
pub async fn lookup_invite(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> AppResult<Json<DataResponse<InviteLookup>>> {
    let invite = find_usable_invite(&state, &params.token).await?;

    let company = CompanyRepo::find_by_id(&state.pool, invite.company_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden("Company is not active".into()))
        })?;

    Ok(Json(DataResponse {
        data: InviteLookup {
            email: invite.email,
            company_name: company.name,
            expires_at: invite.expires_at,
        },
    }))
}

/// POST /api/v1/invites/accept
///
/// Redeem an invite token: creates the employee account and its journey
/// record, marks the invite accepted, and signs the new employee in.
/// Public. Returns 201.
pub async fn accept_invite(
    State(state): State<AppState>,
    Json(input): Json<AcceptInviteRequest>,
) -> AppResult<impl IntoResponse> {
    let invite = find_usable_invite(&state, &input.token).await?;

    CompanyRepo::find_by_id(&state.pool, invite.company_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden("Company is not active".into()))
        })?;

    if input.display_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Display name must not be empty".into(),
        )));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if UserRepo::find_by_email(&state.pool, &invite.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "An account for this email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // The inviting manager becomes the employee's manager.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            company_id: Some(invite.company_id),
            role_id: invite.role_id,
            manager_id: Some(invite.invited_by),
            email: invite.email.clone(),
            display_name: input.display_name.trim().to_string(),
            password_hash,
        },
    )
    .await?;

    // Every employee gets a journey record up front; the dashboard can
    // then always classify them, starting at not_started.
    JourneyRepo::ensure_for_user(&state.pool, user.id).await?;

    let accepted = InviteRepo::mark_accepted(&state.pool, invite.id, user.id, state.clock.now())
        .await?;
    if accepted.is_none() {
        // Lost a race with a parallel accept of the same token.
        return Err(AppError::Core(CoreError::Conflict(
            "Invite has already been used".into(),
        )));
    }

    let role_name = RoleRepo::resolve_name(&state.pool, invite.role_id).await?;

    let event = clarity_events::PlatformEvent::new("invite.accepted")
        .with_company(invite.company_id)
        .with_source("invite", invite.id)
        .with_actor(user.id)
        .with_payload(serde_json::json!({
            "user_id": user.id,
            "invited_by": invite.invited_by,
            "display_name": user.display_name,
        }));
    state.event_bus.publish(event);

    let auth = create_auth_response(&state, &user, &role_name).await?;
    Ok((StatusCode::CREATED, Json(auth)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up a token and reject every unusable state.
///
/// Unknown, revoked and expired tokens are 400s; an already-used token
/// is a 409 so the signup page can say "this invite was already used".
async fn find_usable_invite(state: &AppState, token: &str) -> Result<Invite, AppError> {
    let token_hash = hash_invite_token(token);
    let invite = InviteRepo::find_by_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation("Invite token is not valid".into()))
        })?;

    if invite.revoked_at.is_some() {
        return Err(AppError::Core(CoreError::Validation(
            "Invite has been revoked".into(),
        )));
    }
    if invite.accepted_at.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Invite has already been used".into(),
        )));
    }
    if is_expired(invite.expires_at, state.clock.now()) {
        return Err(AppError::Core(CoreError::Validation(
            "Invite has expired".into(),
        )));
    }
    Ok(invite)
}

fn to_invite_response(invite: &Invite, role: &str) -> InviteResponse {
    InviteResponse {
        id: invite.id,
        email: invite.email.clone(),
        role: role.to_string(),
        token_prefix: invite.token_prefix.clone(),
        expires_at: invite.expires_at,
        accepted_at: invite.accepted_at,
        revoked_at: invite.revoked_at,
        created_at: invite.created_at,
    }
}
