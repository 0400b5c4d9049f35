//! The 1 Hz journey countdown ticker.
//!
//! One task per subscribed connection. Each tick recomputes the snapshot
//! from a cached journey record, so a tick costs no database round trip;
//! the record is refetched on a coarse cadence and immediately when the
//! countdown reaches zero, so a result uploaded during the wait is seen.
//! When the stage moves past `awaiting_release` the ticker sends one
//! final message and stops.

use std::time::Duration;

use axum::extract::ws::Message;
use serde::Serialize;

use clarity_core::journey::{snapshot, JourneySnapshot, JourneyStage};
use clarity_core::DbId;
use clarity_db::repositories::JourneyRepo;

use crate::state::AppState;

/// Seconds between countdown ticks.
const TICK_SECS: u64 = 1;

/// Ticks between cache refreshes from the database.
const REFRESH_TICKS: u32 = 15;

/// One countdown frame pushed to the client.
#[derive(Debug, Serialize)]
struct UpdateMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    snapshot: &'a JourneySnapshot,
}

/// Spawn the countdown ticker for one connection.
///
/// The returned handle is owned by the connection loop and aborted on
/// unsubscribe and on disconnect.
pub fn spawn_countdown(
    state: AppState,
    conn_id: String,
    user_id: DbId,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = run(&state, &conn_id, user_id).await {
            tracing::warn!(conn_id = %conn_id, user_id, error = %e, "Countdown ticker stopped on error");
        }
    })
}

async fn run(state: &AppState, conn_id: &str, user_id: DbId) -> Result<(), sqlx::Error> {
    let mut record = match JourneyRepo::find_by_user_id(&state.pool, user_id).await? {
        Some(journey) => journey,
        None => {
            // Nothing to count down; the snapshot of an absent record is
            // simply not_started.
            let snap = snapshot(
                clarity_core::journey::JourneyFacts {
                    filled: false,
                    filled_at: None,
                    has_result: false,
                },
                &state.release_policy,
                state.clock.now(),
            );
            send_update(state, conn_id, &snap).await;
            return Ok(());
        }
    };

    let mut interval = tokio::time::interval(Duration::from_secs(TICK_SECS));
    let mut ticks_since_refresh: u32 = 0;

    loop {
        interval.tick().await;
        ticks_since_refresh += 1;

        let mut snap = snapshot(record.facts(), &state.release_policy, state.clock.now());

        // Refresh the cache on the coarse cadence, and immediately when
        // the stage left awaiting_release: the final frame must reflect
        // whether a result document appeared during the wait.
        let stage_advanced = snap.stage != JourneyStage::AwaitingRelease;
        if stage_advanced || ticks_since_refresh >= REFRESH_TICKS {
            if let Some(fresh) = JourneyRepo::find_by_user_id(&state.pool, user_id).await? {
                record = fresh;
            }
            ticks_since_refresh = 0;
            snap = snapshot(record.facts(), &state.release_policy, state.clock.now());
        }

        if !send_update(state, conn_id, &snap).await {
            // Connection is gone; the abort from the connection loop may
            // not have landed yet.
            return Ok(());
        }

        if snap.stage != JourneyStage::AwaitingRelease {
            // Final stage message sent.
            return Ok(());
        }
    }
}

/// Push one frame. Returns `false` when the connection no longer exists.
async fn send_update(state: &AppState, conn_id: &str, snap: &JourneySnapshot) -> bool {
    let message = UpdateMessage {
        kind: "journey.update",
        snapshot: snap,
    };
    let body = match serde_json::to_string(&message) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize countdown frame");
            return false;
        }
    };
    state
        .ws_manager
        .send_to_conn(conn_id, Message::Text(body.into()))
        .await
}
