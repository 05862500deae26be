//! Cooldown classification for download triggers.
//!
//! This module provides the [`CooldownPolicy`] and [`TriggerDecision`] types
//! that decide whether a trigger counts as a genuine new download or a repeat
//! within the cooldown window.
//!
//! # Overview
//!
//! A trigger is classified against the stored [`CooldownRecord`] (or its
//! absence) and the current time:
//! - [`TriggerDecision::Allowed`] - no record exists, or the window elapsed
//! - [`TriggerDecision::Blocked`] - the last accepted trigger is too recent
//!
//! Classification is a pure function of its inputs: no clocks, no I/O, no
//! side effects. The caller supplies "now", which is what makes the policy
//! independently testable at exact millisecond boundaries.
//!
//! # Example
//!
//! ```
//! use tallygate::cooldown::{CooldownPolicy, CooldownRecord, TriggerDecision};
//!
//! let policy = CooldownPolicy::default();
//! let record = CooldownRecord::new(1_000);
//!
//! match policy.classify(Some(&record), 5_000) {
//!     TriggerDecision::Allowed => println!("count it"),
//!     TriggerDecision::Blocked { remaining_ms } => {
//!         println!("blocked for another {remaining_ms} ms");
//!     }
//! }
//! ```

use tracing::debug;

use super::record::CooldownRecord;

/// Default cooldown window: 24 hours in milliseconds.
pub const DEFAULT_COOLDOWN_MS: u64 = 86_400_000;

/// Classification outcome for a download trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    /// The trigger represents a genuine new download and may be counted.
    Allowed,

    /// The trigger is a repeat within the cooldown window.
    Blocked {
        /// Time until the window reopens, in milliseconds.
        remaining_ms: u64,
    },
}

/// Decides whether a trigger falls inside or outside the cooldown window.
///
/// The threshold is shared by all content items and is configuration, not
/// persisted state.
#[derive(Debug, Clone, Copy)]
pub struct CooldownPolicy {
    /// Minimum time between accepted triggers for the same content item.
    threshold_ms: u64,
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            threshold_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

impl CooldownPolicy {
    /// Creates a policy with a custom cooldown window in milliseconds.
    ///
    /// A threshold of 0 allows every trigger.
    #[must_use]
    pub fn new(threshold_ms: u64) -> Self {
        Self { threshold_ms }
    }

    /// Returns the configured cooldown window in milliseconds.
    #[must_use]
    pub fn threshold_ms(&self) -> u64 {
        self.threshold_ms
    }

    /// Classifies a trigger against the stored record and the current time.
    ///
    /// Allowed if `record` is absent or `now_ms - lastAcceptedAt` is at
    /// least the threshold; Blocked otherwise. A clock that moved backwards
    /// (now before the record) classifies as Blocked with the full window
    /// remaining rather than wrapping.
    #[must_use]
    pub fn classify(&self, record: Option<&CooldownRecord>, now_ms: u64) -> TriggerDecision {
        let Some(record) = record else {
            debug!("no cooldown record, trigger allowed");
            return TriggerDecision::Allowed;
        };

        let elapsed_ms = now_ms.saturating_sub(record.last_accepted_at_ms);
        if elapsed_ms >= self.threshold_ms {
            debug!(
                elapsed_ms,
                threshold_ms = self.threshold_ms,
                "cooldown window elapsed, trigger allowed"
            );
            TriggerDecision::Allowed
        } else {
            let remaining_ms = self.threshold_ms - elapsed_ms;
            debug!(
                elapsed_ms,
                remaining_ms,
                threshold_ms = self.threshold_ms,
                "within cooldown window, trigger blocked"
            );
            TriggerDecision::Blocked { remaining_ms }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000_000;

    #[test]
    fn test_classify_absent_record_is_allowed() {
        let policy = CooldownPolicy::default();
        assert_eq!(policy.classify(None, T0), TriggerDecision::Allowed);
    }

    #[test]
    fn test_classify_within_window_is_blocked() {
        let policy = CooldownPolicy::default();
        let record = CooldownRecord::new(T0);

        let decision = policy.classify(Some(&record), T0 + 1_000);

        assert_eq!(
            decision,
            TriggerDecision::Blocked {
                remaining_ms: DEFAULT_COOLDOWN_MS - 1_000
            }
        );
    }

    #[test]
    fn test_classify_just_past_window_is_allowed() {
        let policy = CooldownPolicy::default();
        let record = CooldownRecord::new(T0);

        let decision = policy.classify(Some(&record), T0 + 86_400_001);

        assert_eq!(decision, TriggerDecision::Allowed);
    }

    #[test]
    fn test_classify_exactly_at_threshold_is_allowed() {
        // The rule is >=, so the boundary itself reopens the window
        let policy = CooldownPolicy::default();
        let record = CooldownRecord::new(T0);

        let decision = policy.classify(Some(&record), T0 + DEFAULT_COOLDOWN_MS);

        assert_eq!(decision, TriggerDecision::Allowed);
    }

    #[test]
    fn test_classify_one_ms_before_threshold_is_blocked() {
        let policy = CooldownPolicy::default();
        let record = CooldownRecord::new(T0);

        let decision = policy.classify(Some(&record), T0 + DEFAULT_COOLDOWN_MS - 1);

        assert_eq!(decision, TriggerDecision::Blocked { remaining_ms: 1 });
    }

    #[test]
    fn test_classify_same_instant_is_blocked_with_full_window() {
        let policy = CooldownPolicy::default();
        let record = CooldownRecord::new(T0);

        let decision = policy.classify(Some(&record), T0);

        assert_eq!(
            decision,
            TriggerDecision::Blocked {
                remaining_ms: DEFAULT_COOLDOWN_MS
            }
        );
    }

    #[test]
    fn test_classify_clock_moved_backwards_is_blocked() {
        // now < lastAcceptedAt must not wrap into an enormous elapsed value
        let policy = CooldownPolicy::default();
        let record = CooldownRecord::new(T0);

        let decision = policy.classify(Some(&record), T0 - 5_000);

        assert_eq!(
            decision,
            TriggerDecision::Blocked {
                remaining_ms: DEFAULT_COOLDOWN_MS
            }
        );
    }

    #[test]
    fn test_classify_zero_threshold_always_allows() {
        let policy = CooldownPolicy::new(0);
        let record = CooldownRecord::new(T0);

        assert_eq!(
            policy.classify(Some(&record), T0),
            TriggerDecision::Allowed
        );
        assert_eq!(policy.classify(None, T0), TriggerDecision::Allowed);
    }

    #[test]
    fn test_custom_threshold_is_honored() {
        let policy = CooldownPolicy::new(500);
        let record = CooldownRecord::new(T0);

        assert_eq!(
            policy.classify(Some(&record), T0 + 499),
            TriggerDecision::Blocked { remaining_ms: 1 }
        );
        assert_eq!(
            policy.classify(Some(&record), T0 + 500),
            TriggerDecision::Allowed
        );
        assert_eq!(policy.threshold_ms(), 500);
    }

    #[test]
    fn test_default_threshold_is_24_hours() {
        assert_eq!(CooldownPolicy::default().threshold_ms(), 86_400_000);
    }
}
