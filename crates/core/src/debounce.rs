//! Per-key debounced write-behind buffer.
//!
//! Workbook edits arrive keystroke-by-keystroke; persisting each one would
//! hammer storage. The buffer keeps the latest value per key and arms a
//! quiet-period timer. Another edit before the timer fires replaces the
//! value and re-arms the timer, so one save lands per burst of typing.
//!
//! Two rules keep it safe:
//! - An edit may cancel a *scheduled* save, never one already in flight.
//!   The timer task hands off to a detached task before touching the sink.
//! - Every save is guarded by the entry's edit epoch, so a stale save can
//!   never overwrite state owned by a newer edit.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Destination for debounced writes.
///
/// A flush can overlap a save already in flight for the same key, so the
/// sink must tolerate duplicate writes of the same value. Upserts qualify.
#[async_trait::async_trait]
pub trait SaveSink<K>: Send + Sync + 'static {
    async fn save(&self, key: &K, value: &str) -> Result<(), CoreError>;
}

// ---------------------------------------------------------------------------
// Per-key state
// ---------------------------------------------------------------------------

/// Where a buffered key currently stands, echoed back to clients so the UI
/// can render the per-field save indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveState {
    /// An edit is buffered and a save is scheduled or in flight.
    Pending,
    /// The latest edit reached the sink.
    Saved { at: Timestamp },
    /// The latest save attempt failed; the buffered value is retained and
    /// the next edit retries.
    Failed { message: String },
}

struct FieldEntry {
    latest: String,
    /// Bumped on every edit. A save carries the epoch it was scheduled
    /// under and only applies its outcome while that epoch is current.
    epoch: u64,
    state: SaveState,
    timer: Option<JoinHandle<()>>,
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

struct Inner<K, S> {
    quiet: Duration,
    sink: S,
    clock: Arc<dyn Clock>,
    fields: Mutex<HashMap<K, FieldEntry>>,
}

/// Debounced write-behind buffer, shared via cheap clone.
pub struct AutosaveBuffer<K, S> {
    inner: Arc<Inner<K, S>>,
}

impl<K, S> Clone for AutosaveBuffer<K, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, S> AutosaveBuffer<K, S>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    S: SaveSink<K>,
{
    pub fn new(quiet: Duration, sink: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                quiet,
                sink,
                clock,
                fields: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Record `value` as the latest for `key` and (re)arm its quiet-period
    /// timer. Returns the state clients should display, always
    /// [`SaveState::Pending`].
    pub async fn submit(&self, key: K, value: String) -> SaveState {
        let mut fields = self.inner.fields.lock().await;
        let entry = fields.entry(key.clone()).or_insert_with(|| FieldEntry {
            latest: String::new(),
            epoch: 0,
            state: SaveState::Pending,
            timer: None,
        });
        entry.latest = value;
        entry.epoch += 1;
        entry.state = SaveState::Pending;
        if let Some(timer) = entry.timer.take() {
            // Only the scheduled sleep dies here; an in-flight save already
            // moved to its own task.
            timer.abort();
        }
        let epoch = entry.epoch;
        let inner = Arc::clone(&self.inner);
        let timer_key = key;
        entry.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.quiet).await;
            inner.fire(timer_key, epoch).await;
        }));
        SaveState::Pending
    }

    /// Current state of a key, if it has ever been submitted.
    pub async fn state_of(&self, key: &K) -> Option<SaveState> {
        let fields = self.inner.fields.lock().await;
        fields.get(key).map(|e| e.state.clone())
    }

    /// The buffered value for a key. This is the read-your-writes view;
    /// callers overlay it on whatever storage returned.
    pub async fn latest_value(&self, key: &K) -> Option<String> {
        let fields = self.inner.fields.lock().await;
        fields.get(key).map(|e| e.latest.clone())
    }

    /// Buffered entries whose key matches `pred`, with value and state.
    pub async fn overlay_matching(&self, pred: impl Fn(&K) -> bool) -> Vec<(K, String, SaveState)> {
        let fields = self.inner.fields.lock().await;
        fields
            .iter()
            .filter(|(k, _)| pred(k))
            .map(|(k, e)| (k.clone(), e.latest.clone(), e.state.clone()))
            .collect()
    }

    /// Number of keys with an unsaved edit.
    pub async fn dirty_count(&self) -> usize {
        let fields = self.inner.fields.lock().await;
        fields
            .values()
            .filter(|e| matches!(e.state, SaveState::Pending))
            .count()
    }

    /// Persist every pending key matching `pred` now, without waiting out
    /// the quiet period. Returns the number of keys flushed.
    pub async fn flush_matching(&self, pred: impl Fn(&K) -> bool) -> usize {
        // Collect under the lock, save outside it.
        let dirty: Vec<(K, String, u64)> = {
            let mut fields = self.inner.fields.lock().await;
            fields
                .iter_mut()
                .filter(|(k, e)| pred(k) && matches!(e.state, SaveState::Pending))
                .map(|(k, e)| {
                    if let Some(timer) = e.timer.take() {
                        timer.abort();
                    }
                    (k.clone(), e.latest.clone(), e.epoch)
                })
                .collect()
        };
        let flushed = dirty.len();
        for (key, value, epoch) in dirty {
            self.inner.persist(key, value, epoch).await;
        }
        flushed
    }

    /// Persist every pending key now. Called on shutdown so buffered edits
    /// survive a restart.
    pub async fn flush_all(&self) -> usize {
        self.flush_matching(|_| true).await
    }
}

impl<K, S> Inner<K, S>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    S: SaveSink<K>,
{
    /// Quiet period elapsed for `key`. Re-check currency, then hand the
    /// save to a detached task so a later `submit` cannot abort it mid-write.
    async fn fire(self: Arc<Self>, key: K, epoch: u64) {
        let value = {
            let fields = self.fields.lock().await;
            match fields.get(&key) {
                Some(entry) if entry.epoch == epoch => entry.latest.clone(),
                // A newer edit rescheduled before this task was cancelled.
                _ => return,
            }
        };
        let inner = Arc::clone(&self);
        tokio::spawn(async move {
            inner.persist(key, value, epoch).await;
        });
    }

    async fn persist(self: &Arc<Self>, key: K, value: String, epoch: u64) {
        let result = self.sink.save(&key, &value).await;
        let mut fields = self.fields.lock().await;
        let Some(entry) = fields.get_mut(&key) else {
            return;
        };
        if entry.epoch != epoch {
            // A newer edit owns this entry now; its own save will report.
            return;
        }
        match result {
            Ok(()) => entry.state = SaveState::Saved {
                at: self.clock.now(),
            },
            Err(err) => {
                tracing::warn!(key = ?key, error = %err, "autosave persist failed");
                entry.state = SaveState::Failed {
                    message: err.to_string(),
                };
            }
        }
    }
}
