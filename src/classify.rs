//! Transport failure classification.

use std::{error::Error, io};

/// Decides whether a transport error is worth another attempt.
pub trait RetryPredicate: Send + Sync {
    /// Returns `true` when another attempt may succeed.
    fn should_retry(&self, err: &(dyn Error + 'static)) -> bool;
}

impl<F> RetryPredicate for F
where
    F: Fn(&(dyn Error + 'static)) -> bool + Send + Sync,
{
    fn should_retry(&self, err: &(dyn Error + 'static)) -> bool {
        self(err)
    }
}

/// The built-in predicate, backed by [`should_retry`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRetryPredicate;

impl RetryPredicate for DefaultRetryPredicate {
    fn should_retry(&self, err: &(dyn Error + 'static)) -> bool {
        should_retry(err)
    }
}

/// Returns `true` for transient network failures.
///
/// Structured error kinds anywhere in the `source()` chain are checked first.
/// When none match, the error messages are searched for `"broken pipe"` and
/// `"connection reset by peer"`, for transports that only surface text.
pub fn should_retry(err: &(dyn Error + 'static)) -> bool {
    if chain(err).any(|e| io_kind_matches(e, is_reset_kind)) {
        return true;
    }

    if chain(err).any(|e| io_kind_matches(e, |kind| kind == io::ErrorKind::BrokenPipe)) {
        return true;
    }

    if chain(err).any(is_temporary) {
        return true;
    }

    // Last resort: wording differs across platforms and libraries.
    chain(err).any(|e| {
        let message = e.to_string();
        message.contains("broken pipe") || message.contains("connection reset by peer")
    })
}

fn chain<'a>(err: &'a (dyn Error + 'static)) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

fn io_kind_matches(err: &(dyn Error + 'static), pred: impl Fn(io::ErrorKind) -> bool) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|io_err| pred(io_err.kind()))
}

fn is_reset_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
    )
}

fn is_temporary(err: &(dyn Error + 'static)) -> bool {
    if let Some(reqwest_err) = err.downcast_ref::<reqwest::Error>() {
        if reqwest_err.is_timeout() {
            return true;
        }
    }
    if err
        .downcast_ref::<io::Error>()
        .and_then(io::Error::raw_os_error)
        .is_some_and(is_descriptor_exhaustion)
    {
        return true;
    }
    io_kind_matches(err, |kind| {
        matches!(
            kind,
            io::ErrorKind::TimedOut | io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
        )
    })
}

/// EMFILE / ENFILE: the process or system ran out of file descriptors.
#[cfg(unix)]
fn is_descriptor_exhaustion(code: i32) -> bool {
    matches!(code, 23 | 24)
}

#[cfg(not(unix))]
fn is_descriptor_exhaustion(_code: i32) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use std::{fmt, io};

    use super::{should_retry, DefaultRetryPredicate, RetryPredicate};

    #[derive(Debug)]
    struct Wrapped {
        message: &'static str,
        source: Option<io::Error>,
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl std::error::Error for Wrapped {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.source
                .as_ref()
                .map(|e| e as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn reset_and_aborted_connections_are_retryable() {
        assert!(should_retry(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(should_retry(&io::Error::from(
            io::ErrorKind::ConnectionAborted
        )));
    }

    #[test]
    fn broken_pipe_kind_is_retryable() {
        assert!(should_retry(&io::Error::from(io::ErrorKind::BrokenPipe)));
    }

    #[test]
    fn temporary_kinds_are_retryable() {
        assert!(should_retry(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(should_retry(&io::Error::from(io::ErrorKind::Interrupted)));
    }

    #[cfg(unix)]
    #[test]
    fn descriptor_exhaustion_is_retryable() {
        assert!(should_retry(&io::Error::from_raw_os_error(24)));
        assert!(should_retry(&io::Error::from_raw_os_error(23)));
        // ENOENT
        assert!(!should_retry(&io::Error::from_raw_os_error(2)));
    }

    #[test]
    fn io_kind_is_found_through_source_chain() {
        let err = Wrapped {
            message: "error sending request",
            source: Some(io::Error::from(io::ErrorKind::ConnectionReset)),
        };
        assert!(should_retry(&err));
    }

    #[test]
    fn message_fallback_matches_known_phrases() {
        let reset = io::Error::new(io::ErrorKind::Other, "read tcp: connection reset by peer");
        let pipe = io::Error::new(io::ErrorKind::Other, "write tcp: broken pipe");
        assert!(should_retry(&reset));
        assert!(should_retry(&pipe));
    }

    #[test]
    fn message_fallback_applies_to_wrapped_errors() {
        let err = Wrapped {
            message: "client error",
            source: Some(io::Error::new(
                io::ErrorKind::Other,
                "connection reset by peer",
            )),
        };
        assert!(should_retry(&err));
    }

    #[test]
    fn unrelated_errors_are_terminal() {
        let err = io::Error::new(io::ErrorKind::Other, "dial tcp: lookup example.test: no such host");
        assert!(!should_retry(&err));
        assert!(!should_retry(&io::Error::from(io::ErrorKind::NotFound)));
        assert!(!DefaultRetryPredicate.should_retry(&err));
    }

    #[test]
    fn closures_act_as_predicates() {
        let always = |_: &(dyn std::error::Error + 'static)| true;
        let err = io::Error::from(io::ErrorKind::NotFound);
        assert!(always.should_retry(&err));
    }
}
