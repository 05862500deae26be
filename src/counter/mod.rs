//! Remote counter service integration.
//!
//! The authoritative download totals live server-side; this module provides
//! the asynchronous increment operation against that service. The local
//! crate never computes a total itself - it only reports what the service
//! returned.

mod client;
mod error;

pub use client::{CounterClient, HttpCounterClient};
pub use error::CounterError;
