//! Handlers for the `/companies` resource.
//!
//! Public self-service registration creates the tenant together with its
//! first manager account. Everything else is split between the manager's
//! own-company endpoints and the platform-admin CRUD under `/admin`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use clarity_core::error::CoreError;
use clarity_core::roles::ROLE_MANAGER;
use clarity_core::DbId;
use clarity_db::models::company::{Company, CreateCompany, UpdateCompany};
use clarity_db::models::user::CreateUser;
use clarity_db::repositories::{CompanyRepo, RoleRepo, UserRepo};

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::{create_auth_response, AuthResponse};
use crate::middleware::rbac::{RequireAdmin, RequireManager};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /companies/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterCompanyRequest {
    pub company_name: String,
    /// URL-safe identifier. Derived from `company_name` when omitted.
    pub slug: Option<String>,
    pub email: String,
    pub display_name: String,
    pub password: String,
}

/// Response body for `POST /companies/register`.
#[derive(Debug, Serialize)]
pub struct RegisterCompanyResponse {
    pub company: Company,
    /// The first manager account, signed in.
    pub auth: AuthResponse,
}

/// Request body for `PUT /companies/me`.
#[derive(Debug, Deserialize)]
pub struct UpdateMyCompanyRequest {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Public registration
// ---------------------------------------------------------------------------

/// POST /api/v1/companies/register
///
/// Register a new company together with its first manager account.
/// Public. Returns 201 with the company and a signed-in auth response.
pub async fn register_company(
    State(state): State<AppState>,
    Json(input): Json<RegisterCompanyRequest>,
) -> AppResult<impl IntoResponse> {
    let name = input.company_name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Company name must not be empty".into(),
        )));
    }
    validate_email(&input.email)?;
    if input.display_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Display name must not be empty".into(),
        )));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let slug = match &input.slug {
        Some(s) => {
            let s = s.trim().to_string();
            if !is_valid_slug(&s) {
                return Err(AppError::Core(CoreError::Validation(
                    "Slug may only contain lowercase letters, digits and hyphens".into(),
                )));
            }
            s
        }
        None => slugify(name),
    };
    if slug.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Could not derive a slug from the company name; provide one explicitly".into(),
        )));
    }

    // Early duplicate check so the company row is not created for nothing.
    // The unique index on users.email still backstops the race.
    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Email address is already in use".into(),
        )));
    }

    let manager_role = RoleRepo::find_by_name(&state.pool, ROLE_MANAGER)
        .await?
        .ok_or_else(|| AppError::InternalError("Role table is missing 'manager'".into()))?;

    let company = CompanyRepo::create(
        &state.pool,
        &CreateCompany {
            name: name.to_string(),
            slug,
        },
    )
    .await?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            company_id: Some(company.id),
            role_id: manager_role.id,
            manager_id: None,
            email: input.email.trim().to_string(),
            display_name: input.display_name.trim().to_string(),
            password_hash,
        },
    )
    .await?;

    let event = clarity_events::PlatformEvent::new("company.registered")
        .with_company(company.id)
        .with_source("company", company.id)
        .with_actor(user.id)
        .with_payload(serde_json::json!({
            "name": company.name,
            "slug": company.slug,
        }));
    state.event_bus.publish(event);

    let auth = create_auth_response(&state, &user, ROLE_MANAGER).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterCompanyResponse { company, auth }),
    ))
}

// ---------------------------------------------------------------------------
// Manager: own company
// ---------------------------------------------------------------------------

/// GET /api/v1/companies/me
///
/// The authenticated manager's own company.
pub async fn my_company(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
) -> AppResult<Json<DataResponse<Company>>> {
    let company_id = user.company_scope()?;
    let company = CompanyRepo::find_by_id(&state.pool, company_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Company",
                id: company_id,
            })
        })?;
    Ok(Json(DataResponse { data: company }))
}

/// PUT /api/v1/companies/me
///
/// Rename the authenticated manager's company.
pub async fn update_my_company(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Json(input): Json<UpdateMyCompanyRequest>,
) -> AppResult<Json<DataResponse<Company>>> {
    let company_id = user.company_scope()?;
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Company name must not be empty".into(),
        )));
    }

    let company = CompanyRepo::update(
        &state.pool,
        company_id,
        &UpdateCompany {
            name: Some(name.to_string()),
            is_active: None,
        },
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Company",
            id: company_id,
        })
    })?;

    Ok(Json(DataResponse { data: company }))
}

// ---------------------------------------------------------------------------
// Admin CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/companies
///
/// List all companies, inactive ones included. Admin only.
pub async fn list_companies(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Company>>>> {
    let companies = CompanyRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: companies }))
}

/// PUT /api/v1/admin/companies/{id}
///
/// Update a company's name or active flag. Admin only.
pub async fn update_company(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCompany>,
) -> AppResult<Json<DataResponse<Company>>> {
    let company = CompanyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Company", id }))?;
    Ok(Json(DataResponse { data: company }))
}

/// DELETE /api/v1/admin/companies/{id}
///
/// Soft-deactivate a company. Admin only. Returns 204 No Content.
pub async fn deactivate_company(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deactivated = CompanyRepo::deactivate(&state.pool, id).await?;
    if !deactivated {
        return Err(AppError::Core(CoreError::NotFound { entity: "Company", id }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Minimal shape check. Real verification happens when the address is used.
pub(crate) fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email address is required".into(),
        )));
    }
    Ok(())
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
}

/// Derive a URL-safe slug from a display name.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
