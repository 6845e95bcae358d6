use std::time::{Instant, SystemTime};

use bytes::Bytes;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use tracing::Instrument;

use crate::{util::millis, util::unix_millis, RawResponse, RequestError, Result};

/// Identity of one logical request, shared by the engine and the decoder.
#[derive(Debug)]
pub(crate) struct CallContext<'a> {
    pub method: &'a Method,
    pub url: &'a str,
    pub request_id: &'a str,
    pub started_at: SystemTime,
    pub start: Instant,
}

/// Drains the body and applies the success-range check.
pub(crate) async fn read_response(
    response: Response,
    ctx: &CallContext<'_>,
    retry: usize,
) -> Result<RawResponse> {
    let status = response.status();
    let headers = response.headers().clone();

    let read = response
        .bytes()
        .instrument(tracing::debug_span!("request.read_body"))
        .await;

    // The record is emitted whether or not the body could be drained.
    let body = read.as_ref().map(Bytes::clone).unwrap_or_default();
    let body_text = String::from_utf8_lossy(&body);
    tracing::debug!(
        method = %ctx.method,
        url = ctx.url,
        retry,
        request_id = ctx.request_id,
        start = unix_millis(ctx.started_at),
        duration_ms = millis(ctx.start.elapsed()),
        status = status.as_u16(),
        body = %body_text,
        "request"
    );

    if let Err(source) = read {
        return Err(RequestError::Body {
            method: ctx.method.clone(),
            url: ctx.url.to_owned(),
            request_id: ctx.request_id.to_owned(),
            source,
        });
    }

    if status.as_u16() >= 300 {
        return Err(RequestError::Status {
            url: ctx.url.to_owned(),
            status: status.as_u16(),
            body: body_text.into_owned(),
            request_id: ctx.request_id.to_owned(),
        });
    }

    Ok(RawResponse {
        status,
        headers,
        body,
        request_id: ctx.request_id.to_owned(),
        attempts: retry + 1,
    })
}

/// Deserialises a successful body into `T`.
pub(crate) fn decode_json<T: DeserializeOwned>(
    method: &Method,
    url: &str,
    raw: &RawResponse,
) -> Result<T> {
    serde_json::from_slice(&raw.body).map_err(|source| {
        let body = String::from_utf8_lossy(&raw.body).into_owned();
        tracing::error!(
            method = %method,
            url,
            request_id = raw.request_id.as_str(),
            body = %body,
            err = %source,
            "response json decode failed"
        );
        RequestError::Decode {
            method: method.clone(),
            url: url.to_owned(),
            body,
            source,
        }
    })
}
