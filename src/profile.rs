use std::{fmt, sync::Arc, time::Duration};

use crate::{
    classify::{DefaultRetryPredicate, RetryPredicate},
    propagate::{NoopPropagator, TracePropagator},
    transport::{default_client, default_client_builder, Transport},
};

/// Library identifier sent as `User-Agent` unless the caller sets one.
pub const USER_AGENT: &str = concat!("resilient-request/", env!("CARGO_PKG_VERSION"));

/// Maps a 1-based retry number to the pause taken before that retry.
pub trait RetryDelay: Send + Sync {
    /// Pause before retry number `retry`.
    fn delay(&self, retry: usize) -> Duration;
}

impl<F> RetryDelay for F
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn delay(&self, retry: usize) -> Duration {
        self(retry)
    }
}

/// `step × retry`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LinearBackoff {
    pub step: Duration,
}

impl LinearBackoff {
    /// Backoff growing by `step` per retry.
    pub fn new(step: Duration) -> Self {
        Self { step }
    }
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl RetryDelay for LinearBackoff {
    fn delay(&self, retry: usize) -> Duration {
        self.step
            .saturating_mul(u32::try_from(retry).unwrap_or(u32::MAX))
    }
}

/// Retry, transport and header policy for a family of requests.
///
/// Cloning is cheap; clones share the transport and strategy objects.
#[derive(Clone)]
pub struct Profile {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) max_retry: usize,
    pub(crate) retry_delay: Arc<dyn RetryDelay>,
    pub(crate) retry_predicate: Arc<dyn RetryPredicate>,
    pub(crate) user_agent_prefix: String,
    pub(crate) propagator: Arc<dyn TracePropagator>,
    pub(crate) total_timeout: Option<Duration>,
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("max_retry", &self.max_retry)
            .field("user_agent_prefix", &self.user_agent_prefix)
            .field("total_timeout", &self.total_timeout)
            .finish_non_exhaustive()
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            transport: Arc::new(default_client()),
            max_retry: 3,
            retry_delay: Arc::new(LinearBackoff::default()),
            retry_predicate: Arc::new(DefaultRetryPredicate),
            user_agent_prefix: String::new(),
            propagator: Arc::new(NoopPropagator),
            total_timeout: None,
        }
    }
}

impl Profile {
    /// Creates an independent profile with default policy.
    ///
    /// Later changes to the process-wide default do not affect it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a profile from `REQUEST_*` environment variables.
    ///
    /// Reads:
    /// - `REQUEST_MAX_RETRY`: retries after the first attempt
    /// - `REQUEST_RETRY_DELAY_MS`: linear backoff step
    /// - `REQUEST_USER_AGENT_PREFIX`
    /// - `REQUEST_TIMEOUT_MS`: per-attempt timeout of a dedicated client
    /// - `REQUEST_TOTAL_TIMEOUT_MS`: budget across all attempts
    ///
    /// Unset variables keep their defaults. Returns an error for values that
    /// do not parse.
    pub fn from_env() -> std::result::Result<Self, String> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_vars<F>(lookup: F) -> std::result::Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str| -> std::result::Result<Option<u64>, String> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => value
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|err| format!("invalid {key} value {value:?}: {err}")),
                _ => Ok(None),
            }
        };

        let mut profile = Self::new();
        if let Some(max_retry) = parse("REQUEST_MAX_RETRY")? {
            profile.max_retry = usize::try_from(max_retry)
                .map_err(|_| format!("REQUEST_MAX_RETRY out of range: {max_retry}"))?;
        }
        if let Some(step_ms) = parse("REQUEST_RETRY_DELAY_MS")? {
            profile = profile.with_retry_delay(LinearBackoff::new(Duration::from_millis(step_ms)));
        }
        if let Some(prefix) = lookup("REQUEST_USER_AGENT_PREFIX") {
            profile.user_agent_prefix = prefix.trim().to_owned();
        }
        if let Some(timeout_ms) = parse("REQUEST_TIMEOUT_MS")? {
            let client = default_client_builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .map_err(|err| format!("failed to build http client: {err}"))?;
            profile = profile.with_client(client);
        }
        if let Some(total_ms) = parse("REQUEST_TOTAL_TIMEOUT_MS")? {
            profile.total_timeout = Some(Duration::from_millis(total_ms));
        }
        Ok(profile)
    }

    /// Sends attempts through `transport` instead of the shared client.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Sends attempts through a caller-configured `reqwest` client.
    pub fn with_client(self, client: reqwest::Client) -> Self {
        self.with_transport(client)
    }

    /// Retries allowed after the first attempt. `0` disables retrying.
    pub fn with_max_retry(mut self, max_retry: usize) -> Self {
        self.max_retry = max_retry;
        self
    }

    /// Replaces the pause schedule between attempts.
    pub fn with_retry_delay(mut self, delay: impl RetryDelay + 'static) -> Self {
        self.retry_delay = Arc::new(delay);
        self
    }

    /// Replaces the transport failure classification.
    pub fn with_retry_predicate(mut self, predicate: impl RetryPredicate + 'static) -> Self {
        self.retry_predicate = Arc::new(predicate);
        self
    }

    /// Prepended, with one space, to the library `User-Agent`.
    pub fn with_user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = prefix.into();
        self
    }

    /// Injects trace context headers into every attempt.
    pub fn with_propagator(mut self, propagator: impl TracePropagator + 'static) -> Self {
        self.propagator = Arc::new(propagator);
        self
    }

    /// Caps the time spent across attempts: a retry whose delay would end
    /// past this budget is not taken. Unbounded by default.
    pub fn with_total_timeout(mut self, total_timeout: Duration) -> Self {
        self.total_timeout = Some(total_timeout);
        self
    }

    /// Retries allowed after the first attempt.
    pub fn max_retry(&self) -> usize {
        self.max_retry
    }

    /// Prefix prepended to the library `User-Agent`, empty when unset.
    pub fn user_agent_prefix(&self) -> &str {
        &self.user_agent_prefix
    }

    /// Budget across all attempts, if one was set.
    pub fn total_timeout(&self) -> Option<Duration> {
        self.total_timeout
    }

    /// Pause before the given 1-based retry.
    pub fn retry_delay(&self, retry: usize) -> Duration {
        self.retry_delay.delay(retry)
    }

    pub(crate) fn user_agent(&self) -> String {
        if self.user_agent_prefix.is_empty() {
            USER_AGENT.to_owned()
        } else {
            format!("{} {}", self.user_agent_prefix, USER_AGENT)
        }
    }
}
