//! Download gate: cooldown-gated, idempotent counter increments.
//!
//! This module provides the [`DownloadGate`], the orchestrator external
//! callers interact with. It combines the cooldown store, the cooldown
//! policy, and the counter client into the two consumer-facing operations:
//! trigger a download count for a content item, and read the currently
//! displayed total.
//!
//! # Overview
//!
//! A trigger runs through a small per-item state machine: claim the
//! in-flight marker, retrieve and classify the cooldown record, and - only
//! when allowed - dispatch the remote increment. The cooldown record is
//! written after the increment is confirmed, never optimistically, so a
//! failed attempt leaves no lockout behind.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tallygate::{
//!     CooldownPolicy, Database, DownloadGate, HttpCounterClient, SqliteCooldownStore,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(Path::new("tallygate.db")).await?;
//! let store = Arc::new(SqliteCooldownStore::new(db));
//! let counter = Arc::new(HttpCounterClient::new("https://counters.example.com")?);
//! let gate = DownloadGate::new(store, counter, CooldownPolicy::default());
//!
//! gate.observe("abc123", 5);
//! gate.trigger("abc123").await;
//! println!("display count: {:?}", gate.current_display_count("abc123"));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::cooldown::{CooldownPolicy, CooldownStore, TriggerDecision, now_epoch_ms};
use crate::counter::CounterClient;

/// Result of a single trigger, for callers that want to look.
///
/// `trigger` never fails from the caller's perspective; every internal
/// error folds into one of these variants and a log line. Callers running
/// fire-and-forget can drop the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The increment was confirmed; `total` is the authoritative count.
    Counted {
        /// New total reported by the counter service.
        total: u64,
    },

    /// The trigger fell inside the cooldown window; nothing happened.
    OnCooldown {
        /// Time until the window reopens, in milliseconds.
        remaining_ms: u64,
    },

    /// An increment for this content item was already in flight.
    AlreadyInFlight,

    /// The increment failed; nothing was written and the next trigger
    /// re-evaluates from scratch.
    Failed,
}

/// Cached display state for one observed content item.
///
/// The watch sender doubles as the storage for the current value; receivers
/// handed out by [`DownloadGate::observe`] see every confirmed update.
struct DisplayEntry {
    total: watch::Sender<u64>,
    /// Identity of this observation. A stale in-flight result whose
    /// captured generation no longer matches is discarded.
    generation: u64,
}

/// RAII claim on the per-content-item in-flight marker.
///
/// Dropping the guard clears the marker, so every exit path out of
/// `trigger` - blocked, failed, counted, panicked - releases it.
struct InFlightGuard<'a> {
    markers: &'a DashMap<String, ()>,
    content_id: &'a str,
}

impl<'a> InFlightGuard<'a> {
    /// Claims the marker, or returns `None` when a dispatch is already in
    /// flight for this content id. The entry API makes the
    /// check-and-insert atomic under concurrent triggers.
    fn acquire(markers: &'a DashMap<String, ()>, content_id: &'a str) -> Option<Self> {
        match markers.entry(content_id.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(Self {
                    markers,
                    content_id,
                })
            }
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.markers.remove(self.content_id);
    }
}

/// Orchestrator for cooldown-gated download counting.
///
/// The gate guarantees that for each content item at most one increment is
/// in flight at a time, that increments inside the cooldown window are
/// suppressed silently, and that local state only ever reflects confirmed
/// server responses.
///
/// # Concurrency Model
///
/// - Triggers for the same content item are serialized by an in-flight
///   marker; a trigger arriving while one is pending returns immediately
/// - Triggers for different content items proceed independently and may
///   have their increments in flight simultaneously
/// - Display entries carry a generation number; releasing an item while an
///   increment is in flight discards the eventual display write without
///   cancelling the remote call
///
/// # Failure Model
///
/// Storage and counter failures are absorbed here: an unreadable store
/// classifies as "no record" (the feature stays usable without
/// cross-session memory), a failed save costs only that memory, and a
/// failed increment leaves every piece of state untouched and retryable.
pub struct DownloadGate {
    store: Arc<dyn CooldownStore>,
    counter: Arc<dyn CounterClient>,
    policy: CooldownPolicy,

    /// Content ids with an increment currently in flight.
    in_flight: DashMap<String, ()>,

    /// Display state per observed content item.
    displays: DashMap<String, DisplayEntry>,

    /// Source of display-entry generation numbers.
    next_generation: AtomicU64,
}

impl DownloadGate {
    /// Creates a gate from its collaborators.
    ///
    /// All dependencies are explicit: the store that remembers accepted
    /// triggers, the client that talks to the counter service, and the
    /// policy holding the cooldown window.
    #[must_use]
    pub fn new(
        store: Arc<dyn CooldownStore>,
        counter: Arc<dyn CounterClient>,
        policy: CooldownPolicy,
    ) -> Self {
        debug!(
            threshold_ms = policy.threshold_ms(),
            "creating download gate"
        );
        Self {
            store,
            counter,
            policy,
            in_flight: DashMap::new(),
            displays: DashMap::new(),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Starts observing a content item, seeding its display count from the
    /// externally known total, and returns a receiver for confirmed
    /// updates.
    ///
    /// Only the first observation seeds the count; re-observing an already
    /// observed item hands out another receiver without touching the cached
    /// value, which may already be newer than the caller's `initial_total`.
    pub fn observe(&self, content_id: &str, initial_total: u64) -> watch::Receiver<u64> {
        let entry = self
            .displays
            .entry(content_id.to_string())
            .or_insert_with(|| {
                let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
                debug!(content_id, initial_total, generation, "observing content item");
                let (total, _) = watch::channel(initial_total);
                DisplayEntry { total, generation }
            });
        entry.total.subscribe()
    }

    /// Stops observing a content item and drops its display state.
    ///
    /// An increment already in flight keeps running and still records its
    /// cooldown on success, but its display update is discarded; receivers
    /// from [`observe`](Self::observe) see the channel close. Observing the
    /// item again later re-seeds from scratch.
    pub fn release(&self, content_id: &str) {
        if self.displays.remove(content_id).is_some() {
            debug!(content_id, "released display state");
        }
    }

    /// Returns the cached display count for a content item, or `None` if
    /// the item is not currently observed.
    #[must_use]
    pub fn current_display_count(&self, content_id: &str) -> Option<u64> {
        self.displays
            .get(content_id)
            .map(|entry| *entry.total.borrow())
    }

    /// Runs one trigger for a content item.
    ///
    /// Fire-and-forget safe: the returned [`TriggerOutcome`] is
    /// informational and never an error the caller must handle.
    ///
    /// The flow is: claim the in-flight marker (or bail), classify against
    /// the stored cooldown record, and when allowed dispatch the increment.
    /// On confirmation the cooldown record is saved with the trigger's own
    /// timestamp and the display count is updated to the returned total; on
    /// failure nothing is written anywhere.
    #[instrument(skip(self))]
    pub async fn trigger(&self, content_id: &str) -> TriggerOutcome {
        let Some(_in_flight) = InFlightGuard::acquire(&self.in_flight, content_id) else {
            debug!(content_id, "increment already in flight, ignoring trigger");
            return TriggerOutcome::AlreadyInFlight;
        };

        let now_ms = now_epoch_ms();
        let record = self.store.retrieve(content_id).await;

        if let TriggerDecision::Blocked { remaining_ms } =
            self.policy.classify(record.as_ref(), now_ms)
        {
            debug!(content_id, remaining_ms, "trigger blocked by cooldown");
            return TriggerOutcome::OnCooldown { remaining_ms };
        }

        // Capture the display generation before suspending; a release()
        // while the increment is in flight invalidates the pending write.
        let generation = self.displays.get(content_id).map(|entry| entry.generation);

        match self.counter.increment(content_id).await {
            Ok(total) => {
                // Save only after the confirmed increment, with the
                // trigger's timestamp. Best effort: a failed save costs
                // cross-session memory, not the count.
                if let Err(e) = self.store.save(content_id, now_ms).await {
                    warn!(content_id, error = %e, "failed to persist cooldown record");
                }
                self.apply_confirmed_total(content_id, generation, total);
                info!(content_id, total, "download counted");
                TriggerOutcome::Counted { total }
            }
            Err(e) => {
                warn!(content_id, error = %e, "counter increment failed, trigger stays retryable");
                TriggerOutcome::Failed
            }
        }
    }

    /// Applies a confirmed total to the display entry that was current when
    /// the increment was dispatched.
    fn apply_confirmed_total(&self, content_id: &str, generation: Option<u64>, total: u64) {
        let Some(generation) = generation else {
            debug!(content_id, total, "no display target observed, total not cached");
            return;
        };

        match self.displays.get(content_id) {
            Some(entry) if entry.generation == generation => {
                entry.total.send_replace(total);
            }
            Some(_) => {
                debug!(content_id, "display target replaced mid-flight, discarding total");
            }
            None => {
                debug!(content_id, "display target released mid-flight, discarding total");
            }
        }
    }
}
