//! Durable cooldown storage backed by SQLite.
//!
//! The store persists one [`CooldownRecord`] per storage key so cooldown
//! memory survives process restarts. Its failure policy is fail-open:
//! an unreadable store or a corrupted row degrades to "no record", never to
//! an error the triggering flow has to handle.
//!
//! [`CooldownStore`] is the seam the gate depends on; tests substitute
//! doubles for it, and [`SqliteCooldownStore`] is the production
//! implementation.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::record::{CooldownRecord, storage_key};
use crate::db::Database;

/// Errors from cooldown storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The underlying storage could not service the operation.
    #[error("cooldown storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// Persistence seam for cooldown records.
///
/// Concurrent calls for different content ids never interfere; for the same
/// content id the last completed `save` wins.
#[async_trait]
pub trait CooldownStore: Send + Sync {
    /// Fetches the cooldown record for a content item.
    ///
    /// Returns `None` when no record exists, when the store is unreadable,
    /// or when the stored value is malformed. The latter two are logged;
    /// callers see the same "absent" either way.
    async fn retrieve(&self, content_id: &str) -> Option<CooldownRecord>;

    /// Overwrites the cooldown record for a content item.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the write fails. Callers
    /// treat this as non-fatal.
    async fn save(&self, content_id: &str, last_accepted_at_ms: u64) -> Result<(), StoreError>;
}

/// SQLite-backed cooldown store.
///
/// Rows live in the `cooldown_records` table keyed by
/// [`storage_key`]; timestamps are stored as decimal
/// epoch-millisecond strings and validated on the way out.
#[derive(Debug, Clone)]
pub struct SqliteCooldownStore {
    db: Database,
}

impl SqliteCooldownStore {
    /// Creates a store over an open database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        debug!("creating sqlite cooldown store");
        Self { db }
    }

    async fn fetch_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as(r"SELECT last_accepted_at FROM cooldown_records WHERE storage_key = ?")
                .bind(key)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(row.map(|(value,)| value))
    }
}

#[async_trait]
impl CooldownStore for SqliteCooldownStore {
    #[instrument(skip(self))]
    async fn retrieve(&self, content_id: &str) -> Option<CooldownRecord> {
        let key = storage_key(content_id);

        let value = match self.fetch_value(&key).await {
            Ok(value) => value?,
            Err(e) => {
                warn!(key = %key, error = %e, "cooldown store unreadable, treating record as absent");
                return None;
            }
        };

        match CooldownRecord::from_stored_value(&value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key = %key, error = %e, "treating malformed cooldown record as absent");
                None
            }
        }
    }

    #[instrument(skip(self))]
    async fn save(&self, content_id: &str, last_accepted_at_ms: u64) -> Result<(), StoreError> {
        let key = storage_key(content_id);
        let record = CooldownRecord::new(last_accepted_at_ms);

        sqlx::query(
            r"INSERT INTO cooldown_records (storage_key, last_accepted_at, updated_at)
              VALUES (?, ?, datetime('now'))
              ON CONFLICT(storage_key) DO UPDATE SET
                last_accepted_at = excluded.last_accepted_at,
                updated_at = datetime('now')",
        )
        .bind(&key)
        .bind(record.stored_value())
        .execute(self.db.pool())
        .await?;

        debug!(key = %key, last_accepted_at_ms, "cooldown record saved");
        Ok(())
    }
}
