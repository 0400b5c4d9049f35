//! Wires the workbook autosave buffer to Postgres.
//!
//! The buffer itself lives in `clarity_core::debounce` and is storage
//! agnostic. This module provides the sink that lands quiesced field
//! values in the `workbook_entries` table.

use std::sync::Arc;
use std::time::Duration;

use clarity_core::clock::Clock;
use clarity_core::debounce::{AutosaveBuffer, SaveSink};
use clarity_core::workbook::FieldKey;
use clarity_core::{CoreError, DbId};
use clarity_db::repositories::WorkbookRepo;
use clarity_db::DbPool;

/// Buffer key: one slot per user and field.
pub type WorkbookKey = (DbId, FieldKey);

/// The application-wide workbook autosave buffer.
pub type WorkbookAutosave = AutosaveBuffer<WorkbookKey, WorkbookSink>;

/// Persists quiesced workbook values.
///
/// An empty value clears the field instead of storing an empty row.
#[derive(Clone)]
pub struct WorkbookSink {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

#[async_trait::async_trait]
impl SaveSink<WorkbookKey> for WorkbookSink {
    async fn save(&self, key: &WorkbookKey, value: &str) -> Result<(), CoreError> {
        let (user_id, field_key) = key;
        if value.is_empty() {
            WorkbookRepo::clear_field(&self.pool, *user_id, field_key.as_str())
                .await
                .map_err(|e| CoreError::Internal(e.to_string()))?;
        } else {
            WorkbookRepo::upsert_field(
                &self.pool,
                *user_id,
                field_key.as_str(),
                value,
                self.clock.now(),
            )
            .await
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        }
        Ok(())
    }
}

/// Build the autosave buffer used by workbook handlers.
pub fn build_autosave(pool: DbPool, clock: Arc<dyn Clock>, quiet: Duration) -> WorkbookAutosave {
    let sink = WorkbookSink {
        pool,
        clock: Arc::clone(&clock),
    };
    AutosaveBuffer::new(quiet, sink, clock)
}
