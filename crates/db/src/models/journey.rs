//! Journey record entity model.
//!
//! One row per employee. The row stores only facts (submission flag and
//! time, result document); the visible stage is derived in
//! `clarity_core::journey` at read time.

use clarity_core::journey::JourneyFacts;
use clarity_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A journey row from the `journeys` table.
#[derive(Debug, Clone, FromRow)]
pub struct Journey {
    pub id: DbId,
    pub user_id: DbId,
    pub filled: bool,
    pub filled_at: Option<Timestamp>,
    /// The Journey Map document, uploaded by an admin after analysis.
    pub result_html: Option<String>,
    pub result_uploaded_at: Option<Timestamp>,
    pub result_uploaded_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Journey {
    /// Project the row down to the facts the release state machine reads.
    pub fn facts(&self) -> JourneyFacts {
        JourneyFacts {
            filled: self.filled,
            filled_at: self.filled_at,
            has_result: self.result_html.is_some(),
        }
    }
}

/// One row of the manager dashboard: an employee joined with their journey
/// facts and workbook completion count.
#[derive(Debug, Clone, FromRow)]
pub struct JourneyOverviewRow {
    pub user_id: DbId,
    pub display_name: String,
    pub email: String,
    pub filled: bool,
    pub filled_at: Option<Timestamp>,
    pub has_result: bool,
    /// Distinct workbook fields holding a non-empty answer.
    pub answered_fields: i64,
}

impl JourneyOverviewRow {
    pub fn facts(&self) -> JourneyFacts {
        JourneyFacts {
            filled: self.filled,
            filled_at: self.filled_at,
            has_result: self.has_result,
        }
    }
}
