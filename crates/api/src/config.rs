//! Server configuration loaded from environment variables.

use std::time::Duration;

use clarity_core::journey::{ReleasePolicy, DEFAULT_RELEASE_HOURS};

use crate::auth::jwt::JwtConfig;

/// Default quiet window for workbook autosave, in milliseconds.
pub const DEFAULT_WORKBOOK_QUIET_MS: u64 = 1_000;

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Grace period for background tasks during shutdown, in seconds.
    pub shutdown_timeout_secs: u64,
    /// JWT signing configuration.
    pub jwt: JwtConfig,
    /// Hours between journey submission and report release.
    pub journey_release_hours: i64,
    /// Optional override of the release threshold in seconds. Used by
    /// staging environments to exercise the countdown without waiting
    /// three days.
    pub journey_release_override_secs: Option<i64>,
    /// Quiet window for workbook autosave, in milliseconds.
    pub workbook_quiet_ms: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `HOST` | `0.0.0.0` |
    /// | `PORT` | `8080` |
    /// | `CORS_ORIGINS` | `http://localhost:5173` (comma-separated) |
    /// | `REQUEST_TIMEOUT_SECS` | `30` |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `5` |
    /// | `JOURNEY_RELEASE_HOURS` | `72` |
    /// | `JOURNEY_RELEASE_OVERRIDE_SECS` | unset |
    /// | `WORKBOOK_QUIET_MS` | `1000` |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .expect("PORT must be a valid u16");
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");
        let shutdown_timeout_secs = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");
        let journey_release_hours = std::env::var("JOURNEY_RELEASE_HOURS")
            .unwrap_or_else(|_| DEFAULT_RELEASE_HOURS.to_string())
            .parse()
            .expect("JOURNEY_RELEASE_HOURS must be a valid i64");
        let journey_release_override_secs = std::env::var("JOURNEY_RELEASE_OVERRIDE_SECS")
            .ok()
            .map(|v| {
                v.parse()
                    .expect("JOURNEY_RELEASE_OVERRIDE_SECS must be a valid i64")
            });
        let workbook_quiet_ms = std::env::var("WORKBOOK_QUIET_MS")
            .unwrap_or_else(|_| DEFAULT_WORKBOOK_QUIET_MS.to_string())
            .parse()
            .expect("WORKBOOK_QUIET_MS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            journey_release_hours,
            journey_release_override_secs,
            workbook_quiet_ms,
        }
    }

    /// The journey release policy in effect for this deployment.
    ///
    /// The override, when set, wins over the hour-based threshold.
    pub fn release_policy(&self) -> ReleasePolicy {
        match self.journey_release_override_secs {
            Some(secs) => ReleasePolicy::new(chrono::TimeDelta::seconds(secs)),
            None => ReleasePolicy::from_hours(self.journey_release_hours),
        }
    }

    /// The workbook autosave quiet window as a [`Duration`].
    pub fn workbook_quiet(&self) -> Duration {
        Duration::from_millis(self.workbook_quiet_ms)
    }
}
