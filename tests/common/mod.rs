#![allow(dead_code)]

use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Mutex},
};

use resilient_request::{header::HeaderMap, BoxError, Transport, TransportFuture};

/// One scripted outcome of a transport call.
#[derive(Clone, Debug)]
pub enum Step {
    Fail(io::ErrorKind, &'static str),
    Respond(u16, &'static str),
}

/// Transport that replays a fixed script and records each attempt's headers.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Step>>>,
    seen: Arc<Mutex<Vec<HeaderMap>>>,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Arc::new(Mutex::new(steps.into_iter().collect())),
            seen: Arc::default(),
        }
    }

    pub fn failing(kind: io::ErrorKind, message: &'static str, times: usize) -> Self {
        Self::new(std::iter::repeat(Step::Fail(kind, message)).take(times))
    }

    pub fn attempts(&self) -> usize {
        self.seen.lock().expect("seen mutex must not be poisoned").len()
    }

    pub fn seen(&self) -> Vec<HeaderMap> {
        self.seen
            .lock()
            .expect("seen mutex must not be poisoned")
            .clone()
    }

    /// Header value per attempt, `None` where the header was absent.
    pub fn header_values(&self, name: &str) -> Vec<Option<String>> {
        self.seen()
            .iter()
            .map(|headers| {
                headers
                    .get(name)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned)
            })
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: reqwest::Request) -> TransportFuture<'_> {
        self.seen
            .lock()
            .expect("seen mutex must not be poisoned")
            .push(request.headers().clone());
        let next = self
            .script
            .lock()
            .expect("script mutex must not be poisoned")
            .pop_front();

        Box::pin(async move {
            match next {
                Some(Step::Fail(kind, message)) => Err(BoxError::from(io::Error::new(kind, message))),
                Some(Step::Respond(status, body)) => {
                    let response = http::Response::builder()
                        .status(status)
                        .header("content-type", "application/json")
                        .body(body)
                        .map_err(BoxError::from)?;
                    Ok(reqwest::Response::from(response))
                }
                None => Err(BoxError::from("transport script exhausted")),
            }
        })
    }
}
