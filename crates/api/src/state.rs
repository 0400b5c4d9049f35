//! Shared application state.

use std::sync::Arc;

use clarity_core::clock::Clock;
use clarity_core::journey::ReleasePolicy;

use crate::autosave::WorkbookAutosave;
use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state passed to all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: clarity_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub ws_manager: Arc<WsManager>,
    pub event_bus: Arc<clarity_events::EventBus>,
    /// Time source. Tests substitute a fixed clock.
    pub clock: Arc<dyn Clock>,
    /// Journey release threshold in effect for this deployment.
    pub release_policy: ReleasePolicy,
    /// Debounced workbook autosave buffer.
    pub autosave: WorkbookAutosave,
}
