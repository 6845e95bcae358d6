use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT},
    Method, Request, Url,
};

use crate::{Profile, RequestError, Result};

/// Correlation header shared by every attempt of a logical request.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
/// Retry counter, present on the second and later attempts.
pub const RETRY_HEADER: HeaderName = HeaderName::from_static("x-retry");

const APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");

/// Fills in default headers once per logical request and returns the
/// correlation id in effect.
pub(crate) fn prepare_headers(
    profile: &Profile,
    method: &Method,
    url: &str,
    mut headers: HeaderMap,
) -> Result<(HeaderMap, String)> {
    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, APPLICATION_JSON);
    }
    if !headers.contains_key(ACCEPT) {
        headers.insert(ACCEPT, APPLICATION_JSON);
    }
    if !headers.contains_key(USER_AGENT) {
        let user_agent = HeaderValue::from_str(&profile.user_agent()).map_err(|err| {
            RequestError::Construction {
                method: method.clone(),
                url: url.to_owned(),
                reason: format!("invalid user agent prefix: {err}"),
            }
        })?;
        headers.insert(USER_AGENT, user_agent);
    }

    // A caller-supplied id is forwarded byte for byte, even when it is not
    // visible ASCII; only the logged copy is lossily decoded.
    let existing = headers
        .get(&REQUEST_ID_HEADER)
        .filter(|value| !value.as_bytes().is_empty())
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
    let request_id = match existing {
        Some(request_id) => request_id,
        None => {
            let request_id = uuid::Uuid::new_v4().to_string();
            // A hyphenated UUID is always a valid header value.
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                headers.insert(REQUEST_ID_HEADER, value);
            }
            request_id
        }
    };

    Ok((headers, request_id))
}

/// Builds attempt number `attempt` (0-based) from the shared inputs.
pub(crate) fn build_attempt(
    profile: &Profile,
    method: &Method,
    url: &str,
    headers: &HeaderMap,
    body: &Bytes,
    attempt: usize,
) -> Result<Request> {
    let parsed = Url::parse(url).map_err(|err| RequestError::Construction {
        method: method.clone(),
        url: url.to_owned(),
        reason: err.to_string(),
    })?;

    let mut request = Request::new(method.clone(), parsed);
    let mut attempt_headers = headers.clone();
    if attempt > 0 {
        attempt_headers.insert(RETRY_HEADER, HeaderValue::from(attempt));
    }
    profile.propagator.inject(&mut attempt_headers);

    *request.headers_mut() = attempt_headers;
    if !body.is_empty() {
        *request.body_mut() = Some(body.clone().into());
    }
    Ok(request)
}
