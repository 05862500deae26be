//! Tallygate Core Library
//!
//! This library provides the core functionality for tallygate, a
//! cooldown-gated download counter: it counts a download at most once per
//! cooldown window per content item, reports the authoritative total from
//! the remote counter service, and keeps displayed counts consistent with
//! what the server confirmed.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`cooldown`] - Cooldown records, client-local storage, and the
//!   allow/block policy
//! - [`counter`] - HTTP client for the remote counter service
//! - [`db`] - Database connection and schema management
//! - [`gate`] - Orchestrator tying cooldown, counter, and display state
//!   together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cooldown;
pub mod counter;
pub mod db;
pub mod gate;
pub(crate) mod user_agent;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used types
pub use cooldown::{
    COOLDOWN_KEY_PREFIX, CooldownPolicy, CooldownRecord, CooldownStore, DEFAULT_COOLDOWN_MS,
    MalformedRecord, SqliteCooldownStore, StoreError, TriggerDecision, now_epoch_ms, storage_key,
};
pub use counter::{CounterClient, CounterError, HttpCounterClient};
pub use db::{Database, DbError};
pub use gate::{DownloadGate, TriggerOutcome};
