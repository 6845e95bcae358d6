use reqwest::header::HeaderMap;

/// Injects distributed-tracing context into outgoing request headers.
///
/// Called once per attempt, after the crate's own headers are set.
pub trait TracePropagator: Send + Sync {
    fn inject(&self, headers: &mut HeaderMap);
}

impl<F> TracePropagator for F
where
    F: Fn(&mut HeaderMap) + Send + Sync,
{
    fn inject(&self, headers: &mut HeaderMap) {
        self(headers)
    }
}

/// Used when tracing is not active.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPropagator;

impl TracePropagator for NoopPropagator {
    fn inject(&self, _headers: &mut HeaderMap) {}
}
