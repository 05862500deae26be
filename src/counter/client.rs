//! HTTP client for the remote download counter service.
//!
//! This module provides the [`CounterClient`] seam the gate dispatches
//! through, and [`HttpCounterClient`], the reqwest-backed implementation.
//!
//! # Wire contract
//!
//! `POST {base_url}/counters/{content_id}/increment` with no request body.
//! Success is any 2xx carrying a JSON body `{"total": <non-negative int>}`;
//! the total is the authoritative server-side count after this increment,
//! which may have advanced by more than one if other clients incremented
//! concurrently. Anything else - non-2xx, network failure, timeout,
//! unparseable body - is a [`CounterError`], never a count.
//!
//! # Example
//!
//! ```no_run
//! use tallygate::counter::{CounterClient, HttpCounterClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpCounterClient::new("https://counters.example.com")?;
//! let total = client.increment("abc123").await?;
//! println!("new total: {total}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::error::CounterError;
use crate::user_agent;

/// Default connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout in seconds.
/// The increment response is one small JSON object; anything slower than
/// this is treated as a failed increment.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Remote increment operation for the authoritative download counter.
///
/// Implementations perform exactly one increment per call and report the
/// new total. A failure makes no claim about whether server-side state
/// changed.
#[async_trait]
pub trait CounterClient: Send + Sync {
    /// Increments the counter for a content item and returns the new total.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError`] on network failures, timeouts, non-success
    /// statuses, or a response body without a valid total.
    async fn increment(&self, content_id: &str) -> Result<u64, CounterError>;
}

/// Successful increment response body.
#[derive(Debug, Deserialize)]
struct IncrementResponse {
    total: u64,
}

/// Reqwest-backed [`CounterClient`].
///
/// Designed to be created once and reused; the underlying client pools
/// connections. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpCounterClient {
    client: Client,
    base_url: Url,
}

impl HttpCounterClient {
    /// Creates a client for the given counter service base URL.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::InvalidEndpoint`] if the base URL does not
    /// parse or cannot carry path segments.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    pub fn new(base_url: &str) -> Result<Self, CounterError> {
        Self::with_timeouts(base_url, CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::InvalidEndpoint`] if the base URL does not
    /// parse or cannot carry path segments.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(
        base_url: &str,
        connect_timeout_secs: u64,
        request_timeout_secs: u64,
    ) -> Result<Self, CounterError> {
        let parsed = Url::parse(base_url).map_err(|_| CounterError::invalid_endpoint(base_url))?;
        if parsed.cannot_be_a_base() {
            return Err(CounterError::invalid_endpoint(base_url));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(request_timeout_secs))
            .user_agent(user_agent::counter_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Returns the configured counter service base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the increment URL for a content item.
    ///
    /// The content id travels as a single percent-encoded path segment, so
    /// ids containing `/`, spaces, or query metacharacters cannot change the
    /// request route.
    fn increment_url(&self, content_id: &str) -> Result<Url, CounterError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CounterError::invalid_endpoint(self.base_url.as_str()))?
            .pop_if_empty()
            .extend(["counters", content_id, "increment"]);
        Ok(url)
    }
}

#[async_trait]
impl CounterClient for HttpCounterClient {
    #[instrument(skip(self))]
    async fn increment(&self, content_id: &str) -> Result<u64, CounterError> {
        let url = self.increment_url(content_id)?;
        debug!(url = %url, "dispatching counter increment");

        let response = self.client.post(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                CounterError::timeout(url.as_str())
            } else {
                CounterError::network(url.as_str(), e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CounterError::http_status(url.as_str(), status.as_u16()));
        }

        let body: IncrementResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CounterError::timeout(url.as_str())
            } else if e.is_decode() {
                CounterError::invalid_response(url.as_str(), e.to_string())
            } else {
                CounterError::network(url.as_str(), e)
            }
        })?;

        debug!(total = body.total, "counter increment acknowledged");
        Ok(body.total)
    }
}
