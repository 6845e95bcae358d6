use std::time::Duration;

use reqwest::Method;

/// Boxed error produced by a [`Transport`](crate::Transport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The request body could not be encoded as JSON.
    #[error("failed to encode request body: {0}")]
    Serialization(#[source] serde_json::Error),
    /// Malformed URL or header value. Never retried.
    #[error("invalid request {method} {url}: {reason}")]
    Construction {
        method: Method,
        url: String,
        reason: String,
    },
    /// Transport failure that was not retryable, or ran out of retries.
    #[error("request {method} {url} failed after {attempts} attempt(s) in {elapsed:?} (request id {request_id}): {source}")]
    Transport {
        method: Method,
        url: String,
        request_id: String,
        /// Total attempts made, including the first one.
        attempts: usize,
        /// Wall-clock time since the first attempt started.
        elapsed: Duration,
        #[source]
        source: BoxError,
    },
    /// Response headers arrived but reading the body failed.
    #[error("failed to read response body of {method} {url} (request id {request_id}): {source}")]
    Body {
        method: Method,
        url: String,
        request_id: String,
        #[source]
        source: reqwest::Error,
    },
    /// Response status code was 300 or above.
    #[error("request({url}) fail, status: {status}, request id: {request_id}, body: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
        request_id: String,
    },
    /// Response body is not valid JSON for the requested type.
    #[error("invalid response JSON from {method} {url}: {source}; body: {body}")]
    Decode {
        method: Method,
        url: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RequestError {
    /// HTTP status code, for [`RequestError::Status`] errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Correlation id of the logical request, when one was assigned.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Transport { request_id, .. }
            | Self::Body { request_id, .. }
            | Self::Status { request_id, .. } => Some(request_id),
            _ => None,
        }
    }

    /// `true` when no response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
