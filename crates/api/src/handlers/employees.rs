//! Handlers for the manager dashboard: the employees of the manager's
//! company, each with their derived journey stage.
//!
//! Every endpoint here is company-scoped; an id from another tenant
//! behaves exactly like a missing row.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use clarity_core::error::CoreError;
use clarity_core::journey::{classify, snapshot, JourneySnapshot, JourneyStage};
use clarity_core::roles::{ROLE_EMPLOYEE, ROLE_MANAGER};
use clarity_core::types::Timestamp;
use clarity_core::DbId;
use clarity_db::models::user::{UpdateUser, User, UserResponse};
use clarity_db::repositories::{JourneyRepo, RoleRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::users::user_to_response;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /employees`.
#[derive(Debug, Deserialize)]
pub struct EmployeeListParams {
    /// Keep only employees whose journey is in this stage.
    pub stage: Option<String>,
    /// Case-insensitive substring match on name or email.
    pub search: Option<String>,
}

/// One dashboard row.
#[derive(Debug, Serialize)]
pub struct EmployeeOverview {
    pub user_id: DbId,
    pub display_name: String,
    pub email: String,
    pub stage: JourneyStage,
    pub filled_at: Option<Timestamp>,
    pub release_at: Option<Timestamp>,
    pub workbook_completion_percent: f64,
}

/// Request body for `PUT /employees/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub display_name: Option<String>,
    /// Reassign to another manager of the same company.
    pub manager_id: Option<DbId>,
    pub is_active: Option<bool>,
}

/// Full detail view for one employee.
#[derive(Debug, Serialize)]
pub struct EmployeeDetail {
    pub user: UserResponse,
    pub journey: JourneySnapshot,
    pub workbook_completion_percent: f64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/employees
///
/// All active employees of the manager's company with their journey
/// stage, filterable by stage and by a search string.
pub async fn list_employees(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Query(params): Query<EmployeeListParams>,
) -> AppResult<Json<DataResponse<Vec<EmployeeOverview>>>> {
    let company_id = manager.company_scope()?;

    let stage_filter = match &params.stage {
        Some(s) => Some(JourneyStage::parse(s).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!("Unknown stage: {s}")))
        })?),
        None => None,
    };
    let search = params.search.as_deref().map(str::to_lowercase);

    let now = state.clock.now();
    let rows = JourneyRepo::company_overview(&state.pool, company_id).await?;

    let data = rows
        .into_iter()
        .filter(|row| match &search {
            Some(needle) => {
                row.display_name.to_lowercase().contains(needle)
                    || row.email.to_lowercase().contains(needle)
            }
            None => true,
        })
        .filter_map(|row| {
            let stage = classify(row.facts(), &state.release_policy, now);
            if stage_filter.is_some_and(|wanted| wanted != stage) {
                return None;
            }
            let release_at = row.filled_at.map(|at| state.release_policy.release_at(at));
            Some(EmployeeOverview {
                user_id: row.user_id,
                stage,
                filled_at: row.filled_at,
                release_at,
                workbook_completion_percent: field_count_percent(row.answered_fields),
                display_name: row.display_name,
                email: row.email,
            })
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/employees/{id}
///
/// One employee of the manager's company, with journey snapshot and
/// workbook completion. The result document is never included here; the
/// Journey Map belongs to the employee.
pub async fn get_employee(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EmployeeDetail>>> {
    let company_id = manager.company_scope()?;
    let (user, role) = find_company_employee(&state, company_id, id).await?;

    let journey = JourneyRepo::ensure_for_user(&state.pool, user.id).await?;
    let snap = snapshot(journey.facts(), &state.release_policy, state.clock.now());

    let answered = clarity_db::repositories::WorkbookRepo::answered_keys(&state.pool, user.id)
        .await?
        .len() as i64;

    Ok(Json(DataResponse {
        data: EmployeeDetail {
            user: user_to_response(&user, &role),
            journey: snap,
            workbook_completion_percent: field_count_percent(answered),
        },
    }))
}

/// PUT /api/v1/employees/{id}
///
/// Update an employee's profile. Role changes are admin territory and
/// not possible here.
pub async fn update_employee(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEmployeeRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let company_id = manager.company_scope()?;
    let (_user, role) = find_company_employee(&state, company_id, id).await?;

    if let Some(new_manager_id) = input.manager_id {
        let candidate = UserRepo::find_by_id(&state.pool, new_manager_id)
            .await?
            .filter(|u| u.company_id == Some(company_id) && u.is_active)
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(
                    "manager_id does not refer to a manager of this company".into(),
                ))
            })?;
        let candidate_role = RoleRepo::resolve_name(&state.pool, candidate.role_id).await?;
        if candidate_role != ROLE_MANAGER {
            return Err(AppError::Core(CoreError::Validation(
                "manager_id does not refer to a manager of this company".into(),
            )));
        }
    }

    let updated = UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            display_name: input.display_name,
            role_id: None,
            manager_id: input.manager_id,
            is_active: input.is_active,
        },
    )
    .await?
    .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Employee", id }))?;

    Ok(Json(DataResponse {
        data: user_to_response(&updated, &role),
    }))
}

/// DELETE /api/v1/employees/{id}
///
/// Soft-deactivate an employee. Returns 204 No Content.
pub async fn deactivate_employee(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let company_id = manager.company_scope()?;
    find_company_employee(&state, company_id, id).await?;

    let deactivated = UserRepo::deactivate(&state.pool, id).await?;
    if !deactivated {
        return Err(AppError::Core(CoreError::NotFound { entity: "Employee", id }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load an employee of `company_id`, or 404.
///
/// Users of other companies and non-employee roles are indistinguishable
/// from missing rows, so ids cannot be probed across tenants.
async fn find_company_employee(
    state: &AppState,
    company_id: DbId,
    id: DbId,
) -> Result<(User, String), AppError> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|u| u.company_id == Some(company_id))
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Employee", id }))?;

    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    if role != ROLE_EMPLOYEE {
        return Err(AppError::Core(CoreError::NotFound { entity: "Employee", id }));
    }
    Ok((user, role))
}

fn field_count_percent(answered: i64) -> f64 {
    use clarity_core::workbook::FieldKey;
    answered as f64 / FieldKey::ALL.len() as f64 * 100.0
}
