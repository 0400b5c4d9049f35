//! Periodic purge of dead authentication artifacts.
//!
//! Deletes expired or revoked refresh sessions, and invites whose expiry
//! passed long enough ago that nobody needs to see them. Runs on a fixed
//! interval using `tokio::time::interval`.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use clarity_db::repositories::{InviteRepo, SessionRepo};

/// How long an expired invite stays visible in the manager's list before
/// the purge removes its row.
const DEFAULT_INVITE_RETENTION_DAYS: i64 = 30;

/// How often the purge job runs.
const PURGE_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the purge loop.
///
/// Sessions are removed as soon as they are expired or revoked; invites
/// only after `INVITE_RETENTION_DAYS` (default 30) past their expiry, so
/// a manager can still see that an invite lapsed and send a new one.
/// Runs until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    let retention_days: i64 = std::env::var("INVITE_RETENTION_DAYS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_INVITE_RETENTION_DAYS);

    tracing::info!(
        retention_days,
        interval_secs = PURGE_INTERVAL.as_secs(),
        "Purge job started"
    );

    let mut interval = tokio::time::interval(PURGE_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Purge job stopping");
                break;
            }
            _ = interval.tick() => {
                match SessionRepo::cleanup_expired(&pool).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Purge: removed dead sessions");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Purge: session cleanup failed");
                    }
                }

                let cutoff = Utc::now() - chrono::Duration::days(retention_days);
                match InviteRepo::cleanup_expired(&pool, cutoff).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Purge: removed lapsed invites");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Purge: invite cleanup failed");
                    }
                }
            }
        }
    }
}
