use std::{
    future::Future,
    pin::Pin,
    sync::OnceLock,
    time::Duration,
};

use reqwest::{redirect, Request, Response};

use crate::error::BoxError;

/// Future returned by [`Transport::execute`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<Response, BoxError>> + Send + 'a>>;

/// Sends one prepared request. Implementations must be safe to share across
/// concurrent calls; per-attempt timeouts belong here.
pub trait Transport: Send + Sync {
    fn execute(&self, request: Request) -> TransportFuture<'_>;
}

impl Transport for reqwest::Client {
    fn execute(&self, request: Request) -> TransportFuture<'_> {
        Box::pin(async move {
            reqwest::Client::execute(self, request)
                .await
                .map_err(BoxError::from)
        })
    }
}

/// Builder preloaded with the default pool and timeout settings.
///
/// Redirects are not followed: a 3xx is surfaced to the caller as a status
/// failure.
pub fn default_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .connect_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(50)
        .redirect(redirect::Policy::none())
}

/// Process-wide pooled client shared by every profile that does not bring
/// its own transport.
pub fn default_client() -> reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT
        .get_or_init(|| match default_client_builder().build() {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!(err = %err, "default http client setup failed, using reqwest defaults");
                reqwest::Client::default()
            }
        })
        .clone()
}
