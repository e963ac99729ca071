//! Veto and mutation hooks run against a built request before it is sent.

use std::sync::Arc;

use crate::http::TransportRequest;

/// Decides whether a request goes out. Returning `false` aborts the send.
pub type ShouldSend = Arc<dyn Fn(&TransportRequest) -> bool + Send + Sync>;

/// Edits a request in place right before it is transmitted.
pub type WillSend = Arc<dyn Fn(&mut TransportRequest) + Send + Sync>;

#[derive(Debug)]
pub enum PreflightOutcome {
    Send(TransportRequest),
    Vetoed,
}

/// The pair of optional hooks. With neither registered, requests pass
/// through untouched.
#[derive(Clone, Default)]
pub struct Preflight {
    should_send: Option<ShouldSend>,
    will_send: Option<WillSend>,
}

impl Preflight {
    pub fn new(should_send: Option<ShouldSend>, will_send: Option<WillSend>) -> Self {
        Self {
            should_send,
            will_send,
        }
    }

    /// Runs `should_send`, then `will_send` if the request was not vetoed.
    pub fn run(&self, mut request: TransportRequest) -> PreflightOutcome {
        if let Some(should_send) = &self.should_send {
            if !should_send(&request) {
                return PreflightOutcome::Vetoed;
            }
        }
        if let Some(will_send) = &self.will_send {
            will_send(&mut request);
        }
        PreflightOutcome::Send(request)
    }
}

impl std::fmt::Debug for Preflight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preflight")
            .field("should_send", &self.should_send.is_some())
            .field("will_send", &self.will_send.is_some())
            .finish()
    }
}
