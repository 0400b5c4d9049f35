//! Company (tenant) entity model and DTOs.

use clarity_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A company row from the `companies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Company {
    pub id: DbId,
    pub name: String,
    /// URL-safe identifier, unique across the platform.
    pub slug: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new company.
#[derive(Debug, Deserialize)]
pub struct CreateCompany {
    pub name: String,
    pub slug: String,
}

/// DTO for updating an existing company. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}
