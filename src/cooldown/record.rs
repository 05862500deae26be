//! Cooldown record type, storage-key derivation, and timestamp codec.
//!
//! A cooldown record is a single timestamp: the last time a download trigger
//! for a content item was accepted. Records are keyed by a fixed namespace
//! prefix plus the content identifier, and the timestamp is stored as a
//! decimal epoch-millisecond string so the format/parse round trip is exact.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Namespace prefix for cooldown storage keys.
///
/// Keys derived from different content ids never collide because the prefix
/// is fixed and the content id is appended verbatim.
pub const COOLDOWN_KEY_PREFIX: &str = "download-cooldown:";

/// Derives the storage key for a content item's cooldown record.
///
/// Deterministic: the same content id always maps to the same key.
///
/// # Example
///
/// ```
/// use tallygate::cooldown::storage_key;
///
/// assert_eq!(storage_key("abc123"), "download-cooldown:abc123");
/// ```
#[must_use]
pub fn storage_key(content_id: &str) -> String {
    format!("{COOLDOWN_KEY_PREFIX}{content_id}")
}

/// Current wall-clock time as milliseconds since the Unix epoch.
///
/// Clamps to 0 for pre-epoch clocks rather than failing; the policy treats
/// an implausibly small "now" as still-blocked, which is the safe direction.
#[must_use]
pub fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        })
}

/// A stored cooldown value that cannot be parsed back into a timestamp.
///
/// Treated as "no record" by the store (fail-open); surfaced only in logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed cooldown timestamp: {value:?}")]
pub struct MalformedRecord {
    /// The raw stored value that failed to parse.
    pub value: String,
}

/// The persisted cooldown state for one content item.
///
/// At most one record exists per content id. The record is overwritten on
/// every accepted trigger and never deleted by this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownRecord {
    /// When the last download trigger was accepted, in epoch milliseconds.
    pub last_accepted_at_ms: u64,
}

impl CooldownRecord {
    /// Creates a record for a trigger accepted at the given time.
    #[must_use]
    pub fn new(last_accepted_at_ms: u64) -> Self {
        Self {
            last_accepted_at_ms,
        }
    }

    /// Renders the timestamp as the stored string value.
    ///
    /// Paired with [`from_stored_value`](Self::from_stored_value); the round
    /// trip is exact for every `u64`.
    #[must_use]
    pub fn stored_value(&self) -> String {
        self.last_accepted_at_ms.to_string()
    }

    /// Parses a stored string value back into a record.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord`] when the value is not a plain decimal
    /// `u64` (corrupted rows, negative numbers, fractions, trailing junk).
    pub fn from_stored_value(value: &str) -> Result<Self, MalformedRecord> {
        value
            .parse::<u64>()
            .map(Self::new)
            .map_err(|_| MalformedRecord {
                value: value.to_string(),
            })
    }
}
