//! Cooldown gating for download triggers.
//!
//! This module owns everything about the cooldown window: the persisted
//! record of the last accepted trigger per content item, the storage that
//! holds it, and the pure policy that classifies a trigger as allowed or
//! blocked.
//!
//! # Features
//!
//! - Durable per-content-item records (survive restarts)
//! - Fail-open storage: unreadable or corrupted records degrade to "absent"
//! - Exact round-trip timestamp encoding (decimal epoch milliseconds)
//! - Pure, millisecond-precise classification
//!
//! # Example
//!
//! ```no_run
//! use tallygate::cooldown::{CooldownPolicy, CooldownStore, SqliteCooldownStore, TriggerDecision, now_epoch_ms};
//! use tallygate::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new_in_memory().await?;
//! let store = SqliteCooldownStore::new(db);
//! let policy = CooldownPolicy::default();
//!
//! let record = store.retrieve("abc123").await;
//! if policy.classify(record.as_ref(), now_epoch_ms()) == TriggerDecision::Allowed {
//!     // count the download, then:
//!     store.save("abc123", now_epoch_ms()).await?;
//! }
//! # Ok(())
//! # }
//! ```

mod policy;
mod record;
mod store;

pub use policy::{CooldownPolicy, DEFAULT_COOLDOWN_MS, TriggerDecision};
pub use record::{COOLDOWN_KEY_PREFIX, CooldownRecord, MalformedRecord, now_epoch_ms, storage_key};
pub use store::{CooldownStore, SqliteCooldownStore, StoreError};
