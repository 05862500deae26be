//! Error types for the counter client.
//!
//! Every variant is a failed increment from the gate's point of view; the
//! distinctions exist for logs and operator diagnostics, not for branching.
//! None of them makes a claim about whether server-side state changed.

use thiserror::Error;

/// Errors that can occur while incrementing the remote counter.
#[derive(Debug, Error)]
pub enum CounterError {
    /// The configured counter endpoint is not a usable base URL.
    #[error("invalid counter endpoint: {url}")]
    InvalidEndpoint {
        /// The endpoint string that was rejected.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error incrementing counter at {url}: {source}")]
    Network {
        /// The request URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before a response arrived.
    #[error("timeout incrementing counter at {url}")]
    Timeout {
        /// The request URL that timed out.
        url: String,
    },

    /// The counter service answered with a non-success status.
    ///
    /// Never interpreted as a total of 0; an error response carries no
    /// usable count.
    #[error("HTTP {status} incrementing counter at {url}")]
    HttpStatus {
        /// The request URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// A 2xx response whose body did not contain a valid total.
    #[error("invalid counter response from {url}: {detail}")]
    InvalidResponse {
        /// The request URL that produced the response.
        url: String,
        /// What was wrong with the body.
        detail: String,
    },
}

impl CounterError {
    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>) -> Self {
        Self::InvalidEndpoint { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid response error.
    pub fn invalid_response(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            detail: detail.into(),
        }
    }
}
