use crate::Error;
use std::time::Duration;

/// Internal decision for how to proceed after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Retry { delay: Duration },
    Fail,
}

/// Internal policy engine for the retry loop.
///
/// Every transient failure is retried after the same fixed delay until the
/// descriptor's budget runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PolicyEngine {
    pub delay: Duration,
    pub retry_client_errors: bool,
}

impl PolicyEngine {
    pub fn new(delay: Duration, retry_client_errors: bool) -> Self {
        Self {
            delay,
            retry_client_errors,
        }
    }

    /// Whether a failure is eligible for another attempt at all.
    pub fn is_transient(&self, err: &Error) -> bool {
        match err {
            Error::Timeout { .. } | Error::Transport(_) => true,
            Error::Service { status, .. } => {
                self.retry_client_errors || !(400..500).contains(status)
            }
            // The round-trip already succeeded or the request can never succeed.
            Error::Decode { .. } | Error::Configuration { .. } => false,
            Error::StreamParse(_) | Error::StreamConnection(_) | Error::StreamNotice(_) => false,
        }
    }

    /// Decide what to do after an attempt failed.
    ///
    /// `retries_left` is the budget remaining *before* this decision.
    pub fn decide(&self, err: &Error, retries_left: u32) -> Decision {
        if retries_left > 0 && self.is_transient(err) {
            Decision::Retry { delay: self.delay }
        } else {
            Decision::Fail
        }
    }
}
