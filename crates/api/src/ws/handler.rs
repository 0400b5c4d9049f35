use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use clarity_core::error::CoreError;
use clarity_core::roles::ROLE_EMPLOYEE;

use crate::auth::jwt::{validate_token, Claims};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::countdown::spawn_countdown;

/// Query parameters for the WebSocket upgrade. Browsers cannot set an
/// `Authorization` header on a WebSocket request, so the token rides in
/// the query string.
#[derive(Debug, Deserialize)]
pub struct WsAuthParams {
    pub token: Option<String>,
}

/// HTTP handler that authenticates and upgrades the connection.
///
/// Rejects with 401 before the upgrade when the token is missing or
/// invalid; after the upgrade the connection is registered with
/// `WsManager` and managed by two tasks (sender + receiver).
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsAuthParams>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let token = params.token.ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Missing token parameter".into()))
    })?;
    let claims = validate_token(&token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, claims)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Dispatches inbound control messages on the current task.
///   4. Cleans up on disconnect, aborting the countdown ticker if one runs.
async fn handle_socket(socket: WebSocket, state: AppState, claims: Claims) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id = claims.sub, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = state
        .ws_manager
        .add(conn_id.clone(), claims.sub, claims.company_id)
        .await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // The countdown ticker for this connection, if subscribed. Owned here
    // so it can never outlive the connection.
    let mut countdown_task: Option<tokio::task::JoinHandle<()>> = None;

    // Receiver loop: process inbound control messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                dispatch_text(&state, &conn_id, &claims, &text, &mut countdown_task).await;
            }
            Ok(_msg) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: stop the ticker, remove the connection, stop the sender.
    if let Some(task) = countdown_task.take() {
        task.abort();
    }
    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Handle one inbound text frame.
///
/// The protocol is a JSON object with a `type` field:
/// `journey.subscribe` starts the 1 Hz countdown ticker for the
/// connection's user, `journey.unsubscribe` stops it. Anything else gets
/// an error frame back.
async fn dispatch_text(
    state: &AppState,
    conn_id: &str,
    claims: &Claims,
    text: &str,
    countdown_task: &mut Option<tokio::task::JoinHandle<()>>,
) {
    let kind = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(String::from));

    match kind.as_deref() {
        Some("journey.subscribe") => {
            if claims.role != ROLE_EMPLOYEE {
                send_error(state, conn_id, "Only employees have a journey countdown").await;
                return;
            }
            // Re-subscribing replaces the previous ticker.
            if let Some(task) = countdown_task.take() {
                task.abort();
            }
            *countdown_task = Some(spawn_countdown(
                state.clone(),
                conn_id.to_string(),
                claims.sub,
            ));
        }
        Some("journey.unsubscribe") => {
            if let Some(task) = countdown_task.take() {
                task.abort();
            }
        }
        Some(other) => {
            tracing::debug!(conn_id = %conn_id, message_type = other, "Unknown WebSocket message type");
            send_error(state, conn_id, "Unknown message type").await;
        }
        None => {
            send_error(state, conn_id, "Messages must be JSON with a type field").await;
        }
    }
}

async fn send_error(state: &AppState, conn_id: &str, message: &str) {
    let body = serde_json::json!({ "type": "error", "message": message });
    state
        .ws_manager
        .send_to_conn(conn_id, Message::Text(body.to_string().into()))
        .await;
}
