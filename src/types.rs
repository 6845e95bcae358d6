use bytes::Bytes;
use reqwest::{header::HeaderMap, StatusCode};

/// Response metadata and raw body of a successful logical request.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Correlation id sent with every attempt.
    pub request_id: String,
    /// Attempts made, including the one that produced this response.
    pub attempts: usize,
}

impl RawResponse {
    /// Body as UTF-8 text, with invalid sequences replaced.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
