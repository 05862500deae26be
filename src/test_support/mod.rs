//! Shared helpers for unit tests.
//!
//! Compiled only under `cfg(test)`; not part of the public API.

pub mod socket_guard;
