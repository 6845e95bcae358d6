use std::time::{Duration, Instant, SystemTime};

use bytes::Bytes;
use reqwest::{header::HeaderMap, Method};
use serde::{de::DeserializeOwned, Serialize};
use tokio::time::sleep;
use tracing::Instrument;

use crate::{
    builder::{build_attempt, prepare_headers},
    decode::{decode_json, read_response, CallContext},
    util::{millis, unix_millis},
    Profile, RawResponse, RequestError, Result,
};

/// Typed "no request body" for the `body` argument.
pub const NO_BODY: Option<&'static ()> = None;

impl Profile {
    /// Sends a request and decodes the JSON response into `T`.
    ///
    /// Transport failures are retried according to this profile. Status
    /// codes of 300 and above are returned as [`RequestError::Status`] and
    /// never retried.
    pub async fn request_json<T, B>(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (_, value) = self
            .request_json_with_response(method, url, headers, body)
            .await?;
        Ok(value)
    }

    /// Like [`Profile::request_json`], also returning the raw response.
    pub async fn request_json_with_response<T, B>(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<&B>,
    ) -> Result<(RawResponse, T)>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let raw = self.send(method.clone(), url, headers, body).await?;
        let value = decode_json(&method, url, &raw)?;
        Ok((raw, value))
    }

    /// Sends a request and returns the raw response without decoding it.
    ///
    /// The status check still applies.
    pub async fn send<B>(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<&B>,
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let body = encode_body(&method, url, body)?;
        let (headers, request_id) = prepare_headers(self, &method, url, headers)?;

        let span = tracing::debug_span!(
            "request",
            method = %method,
            url,
            request_id = request_id.as_str()
        );
        self.execute(&method, url, &headers, body, &request_id)
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
        body: Bytes,
        request_id: &str,
    ) -> Result<RawResponse> {
        let ctx = CallContext {
            method,
            url,
            request_id,
            started_at: SystemTime::now(),
            start: Instant::now(),
        };

        let mut retry = 0usize;
        let response = loop {
            let request =
                build_attempt(self, method, url, headers, &body, retry).map_err(|err| {
                    tracing::error!(method = %method, url, err = %err, "request construction failed");
                    err
                })?;

            let attempt_started_at = SystemTime::now();
            let attempt_start = Instant::now();
            let outcome = self
                .transport
                .execute(request)
                .instrument(tracing::debug_span!("request.attempt", retry))
                .await;

            let err = match outcome {
                Ok(response) => break response,
                Err(err) => err,
            };

            let duration_ms = millis(attempt_start.elapsed());
            if retry < self.max_retry && self.retry_predicate.should_retry(&*err) {
                let delay = self.retry_delay.delay(retry + 1);
                if self.within_budget(ctx.start.elapsed(), delay) {
                    tracing::warn!(
                        method = %method,
                        url,
                        retry,
                        request_id,
                        start = unix_millis(attempt_started_at),
                        duration_ms,
                        delay_ms = millis(delay),
                        err = %err,
                        "transport call failed, retrying"
                    );
                    sleep(delay).await;
                    retry += 1;
                    continue;
                }
            }

            tracing::error!(
                method = %method,
                url,
                retry,
                request_id,
                start = unix_millis(attempt_started_at),
                duration_ms,
                err = %err,
                "transport call failed"
            );
            return Err(RequestError::Transport {
                method: method.clone(),
                url: url.to_owned(),
                request_id: request_id.to_owned(),
                attempts: retry + 1,
                elapsed: ctx.start.elapsed(),
                source: err,
            });
        };

        read_response(response, &ctx, retry).await
    }

    fn within_budget(&self, elapsed: Duration, delay: Duration) -> bool {
        match self.total_timeout {
            Some(total) => elapsed.saturating_add(delay) < total,
            None => true,
        }
    }
}

fn encode_body<B>(method: &Method, url: &str, body: Option<&B>) -> Result<Bytes>
where
    B: Serialize + ?Sized,
{
    let Some(body) = body else {
        return Ok(Bytes::new());
    };
    serde_json::to_vec(body).map(Bytes::from).map_err(|err| {
        tracing::error!(method = %method, url, err = %err, "request body encode failed");
        RequestError::Serialization(err)
    })
}
