//! `resilient-request` sends JSON HTTP requests and retries transient
//! transport failures.
//!
//! Every logical request gets default JSON headers, a `User-Agent`, an
//! `X-Request-Id` correlation id shared by all of its attempts, and an
//! `X-Retry` counter on retried attempts. Entry points:
//! - [`request_json`] / [`request_json_with_response`] on the process-wide
//!   default profile, tuned with [`configure_default`]
//! - [`Profile::request_json`], [`Profile::request_json_with_response`] and
//!   [`Profile::send`] on an independent [`Profile`]

mod builder;
mod classify;
mod client;
mod decode;
mod error;
mod global;
mod profile;
mod propagate;
mod transport;
mod types;
mod util;

pub use builder::{REQUEST_ID_HEADER, RETRY_HEADER};
pub use classify::{should_retry, DefaultRetryPredicate, RetryPredicate};
pub use client::NO_BODY;
pub use error::{BoxError, RequestError};
pub use global::{configure_default, default_profile, request_json, request_json_with_response};
pub use profile::{LinearBackoff, Profile, RetryDelay, USER_AGENT};
pub use propagate::{NoopPropagator, TracePropagator};
pub use transport::{default_client, default_client_builder, Transport, TransportFuture};
pub use types::RawResponse;

pub use reqwest::{header, Method, StatusCode};

pub type Result<T> = std::result::Result<T, RequestError>;
