//! Event-to-toast routing.
//!
//! [`ToastRouter`] subscribes to the platform event bus and turns critical
//! events into toast frames pushed over WebSocket to the people the event
//! concerns. Non-critical events stay in the audit trail only; which
//! events are critical is data, read from the `event_types` catalog.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;

use clarity_core::types::DbId;
use clarity_db::repositories::EventRepo;
use clarity_db::DbPool;
use clarity_events::PlatformEvent;

use crate::ws::WsManager;

/// Routes critical platform events to toast notifications.
pub struct ToastRouter {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
}

impl ToastRouter {
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>) -> Self {
        Self { pool, ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed, i.e. when the
    /// [`EventBus`](clarity_events::EventBus) is dropped at shutdown.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Toast router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, toast router shutting down");
                    break;
                }
            }
        }
    }

    /// Route a single event, if it is one people get toasted about.
    async fn route_event(&self, event: &PlatformEvent) -> Result<(), sqlx::Error> {
        if !EventRepo::is_critical(&self.pool, &event.event_type).await? {
            return Ok(());
        }

        let targets = determine_targets(event);
        let message = toast_message(event);

        if targets.is_empty() {
            // A critical event nobody is addressed to still reaches the
            // company, so managers see it whichever dashboard is open.
            if let Some(company_id) = event.company_id {
                let delivered = self
                    .ws_manager
                    .send_to_company(company_id, message)
                    .await;
                tracing::debug!(
                    event_type = %event.event_type,
                    company_id,
                    delivered,
                    "Toast fanned out to company"
                );
            }
            return Ok(());
        }

        for user_id in targets {
            let delivered = self.ws_manager.send_to_user(user_id, message.clone()).await;
            tracing::debug!(
                event_type = %event.event_type,
                user_id,
                delivered,
                "Toast routed to user"
            );
        }

        Ok(())
    }
}

/// Who a critical event is addressed to.
///
/// Each arm reads the id the publishing handler put in the payload:
/// an uploaded result belongs to the employee, a submission to their
/// manager, an accepted invite to whoever sent it. An absent or
/// malformed id falls through to the company fan-out.
fn determine_targets(event: &PlatformEvent) -> Vec<DbId> {
    let payload_id = |key: &str| -> Option<DbId> {
        event.payload.get(key).and_then(|v| v.as_i64())
    };

    match event.event_type.as_str() {
        "journey.result_uploaded" => payload_id("user_id").into_iter().collect(),
        "journey.submitted" => payload_id("manager_id").into_iter().collect(),
        "invite.accepted" => payload_id("invited_by").into_iter().collect(),
        _ => vec![],
    }
}

/// Build the toast frame for an event.
fn toast_message(event: &PlatformEvent) -> Message {
    let body = serde_json::json!({
        "type": "toast",
        "event_type": event.event_type,
        "source_entity_type": event.source_entity_type,
        "source_entity_id": event.source_entity_id,
        "payload": event.payload,
        "timestamp": event.timestamp,
    });
    Message::Text(body.to_string().into())
}
