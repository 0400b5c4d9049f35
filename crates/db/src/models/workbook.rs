//! Workbook entry entity model.

use clarity_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A workbook entry row from the `workbook_entries` table.
///
/// One row per `(user, field)`; debounced autosaves upsert in place. The
/// `field_key` column holds the wire name of a
/// `clarity_core::workbook::FieldKey` and is validated before insert.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkbookEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub field_key: String,
    pub value: String,
    /// When the debounced save that produced this value landed.
    pub saved_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
