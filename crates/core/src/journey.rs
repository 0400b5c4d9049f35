//! Journey Map release state machine.
//!
//! A Journey Map becomes visible a fixed time after the employee submits
//! their assessment, never earlier. Everything here is pure math over a
//! caller-supplied "now" so the API layer, the countdown ticker, and tests
//! all classify identically. This module lives in `core` (zero internal
//! deps) so it can be used by both the API layer and any future tooling.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Hours between assessment submission and Journey Map release.
pub const DEFAULT_RELEASE_HOURS: i64 = 72;

/// Milliseconds per whole day, for countdown decomposition.
pub const MS_PER_DAY: i64 = 86_400_000;

/// Milliseconds per whole hour.
pub const MS_PER_HOUR: i64 = 3_600_000;

/// Milliseconds per whole minute.
pub const MS_PER_MINUTE: i64 = 60_000;

/// Milliseconds per whole second.
pub const MS_PER_SECOND: i64 = 1_000;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Where one employee sits in the journey lifecycle.
///
/// Derived, never stored: the database keeps only the submission flag, the
/// submission time, and the (possibly absent) result document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStage {
    /// Assessment not submitted yet.
    NotStarted,
    /// Submitted, release instant still in the future.
    AwaitingRelease,
    /// Release instant passed but no result document exists yet.
    ResultPending,
    /// Release instant passed and the result document is available.
    ResultReady,
}

impl JourneyStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::AwaitingRelease => "awaiting_release",
            Self::ResultPending => "result_pending",
            Self::ResultReady => "result_ready",
        }
    }

    /// Parse a stage from its wire name (used by dashboard stage filters).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "awaiting_release" => Some(Self::AwaitingRelease),
            "result_pending" => Some(Self::ResultPending),
            "result_ready" => Some(Self::ResultReady),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Release policy
// ---------------------------------------------------------------------------

/// How long after submission the Journey Map unlocks.
///
/// Constructed once from config at startup and shared; the threshold is
/// never read from the environment at classification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleasePolicy {
    threshold: chrono::TimeDelta,
}

impl ReleasePolicy {
    /// Build a policy with an explicit threshold. Negative deltas clamp to
    /// zero rather than releasing into the past.
    pub fn new(threshold: chrono::TimeDelta) -> Self {
        Self {
            threshold: threshold.max(chrono::TimeDelta::zero()),
        }
    }

    pub fn from_hours(hours: i64) -> Self {
        Self::new(chrono::TimeDelta::hours(hours))
    }

    /// The production default of [`DEFAULT_RELEASE_HOURS`].
    pub fn standard() -> Self {
        Self::from_hours(DEFAULT_RELEASE_HOURS)
    }

    /// Zero-wait policy for local development and staging walkthroughs.
    pub fn immediate() -> Self {
        Self::new(chrono::TimeDelta::zero())
    }

    pub fn threshold(&self) -> chrono::TimeDelta {
        self.threshold
    }

    /// The instant the Journey Map unlocks for a submission at `filled_at`.
    pub fn release_at(&self, filled_at: Timestamp) -> Timestamp {
        filled_at + self.threshold
    }
}

impl Default for ReleasePolicy {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The journey-relevant fields of one employee record, as read from storage.
#[derive(Debug, Clone, Copy)]
pub struct JourneyFacts {
    /// Whether the assessment has been submitted.
    pub filled: bool,
    /// When it was submitted. Must be present whenever `filled` is true.
    pub filled_at: Option<Timestamp>,
    /// Whether a result document has been attached to the record.
    pub has_result: bool,
}

/// Classify one record at instant `now`.
///
/// A record marked filled without a submission time is a data-integrity
/// fault; it degrades to [`JourneyStage::ResultPending`] (never a panic,
/// never an early release) and is logged for operators.
pub fn classify(facts: JourneyFacts, policy: &ReleasePolicy, now: Timestamp) -> JourneyStage {
    if !facts.filled {
        return JourneyStage::NotStarted;
    }
    let Some(filled_at) = facts.filled_at else {
        tracing::warn!("journey record marked filled without a submission time, treating as pending");
        return JourneyStage::ResultPending;
    };
    if now < policy.release_at(filled_at) {
        // The gate holds even when the result document already exists.
        JourneyStage::AwaitingRelease
    } else if facts.has_result {
        JourneyStage::ResultReady
    } else {
        JourneyStage::ResultPending
    }
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// Remaining wait decomposed into whole display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Decompose a millisecond remainder into days/hours/minutes/seconds.
    ///
    /// Units never overlap: each divisor consumes its whole multiples and
    /// passes the remainder down. Negative input clamps to zero so a ticker
    /// that fires just past the release instant shows zeros, not negatives.
    pub fn from_millis(remaining_ms: i64) -> Self {
        let ms = remaining_ms.max(0);
        let days = ms / MS_PER_DAY;
        let ms = ms % MS_PER_DAY;
        let hours = ms / MS_PER_HOUR;
        let ms = ms % MS_PER_HOUR;
        let minutes = ms / MS_PER_MINUTE;
        let ms = ms % MS_PER_MINUTE;
        let seconds = ms / MS_PER_SECOND;
        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

/// Milliseconds until release, clamped at zero once the instant has passed.
pub fn remaining_ms(filled_at: Timestamp, policy: &ReleasePolicy, now: Timestamp) -> i64 {
    (policy.release_at(filled_at) - now).num_milliseconds().max(0)
}

/// Countdown to release, or `None` once `now` has reached the release
/// instant. Callers render `None` as "available now" rather than zeros.
pub fn countdown_until_release(
    filled_at: Timestamp,
    policy: &ReleasePolicy,
    now: Timestamp,
) -> Option<Countdown> {
    if now >= policy.release_at(filled_at) {
        return None;
    }
    Some(Countdown::from_millis(remaining_ms(filled_at, policy, now)))
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Percentage of the release wait already elapsed, clamped to `[0, 100]`.
///
/// A zero-threshold policy reports 100 immediately; there is no wait to
/// measure progress against.
pub fn progress_percent(filled_at: Timestamp, policy: &ReleasePolicy, now: Timestamp) -> f64 {
    let total = policy.threshold().num_milliseconds();
    if total <= 0 {
        return 100.0;
    }
    let elapsed = (now - filled_at).num_milliseconds();
    (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything a client needs to render the journey panel at one instant.
///
/// The result document itself is attached by the API layer, and only when
/// the stage is [`JourneyStage::ResultReady`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneySnapshot {
    pub stage: JourneyStage,
    pub filled_at: Option<Timestamp>,
    pub release_at: Option<Timestamp>,
    pub countdown: Option<Countdown>,
    pub progress_percent: f64,
}

/// Build the full derived view for one record at instant `now`.
pub fn snapshot(facts: JourneyFacts, policy: &ReleasePolicy, now: Timestamp) -> JourneySnapshot {
    let stage = classify(facts, policy, now);
    match (stage, facts.filled_at) {
        (JourneyStage::NotStarted, _) | (_, None) => JourneySnapshot {
            stage,
            filled_at: None,
            release_at: None,
            countdown: None,
            progress_percent: 0.0,
        },
        (_, Some(filled_at)) => JourneySnapshot {
            stage,
            filled_at: Some(filled_at),
            release_at: Some(policy.release_at(filled_at)),
            countdown: countdown_until_release(filled_at, policy, now),
            progress_percent: progress_percent(filled_at, policy, now),
        },
    }
}
