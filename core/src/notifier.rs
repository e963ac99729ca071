//! Side channel reporting the raw artifacts of every real network attempt.
//!
//! The observer runs on the request task before classification. A panic in
//! the observer is caught and logged; it never changes what the caller's
//! completion receives.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;

use crate::error::TransportError;
use crate::http::{TransportRequest, TransportResponse};

/// Unparsed view of a finished exchange.
#[derive(Debug, Clone, Copy)]
pub struct CompletedExchange<'a> {
    pub request: &'a TransportRequest,
    pub data: Option<&'a Bytes>,
    pub response: Option<&'a TransportResponse>,
    pub error: Option<&'a TransportError>,
}

pub type CompletionObserver = Arc<dyn Fn(&CompletedExchange<'_>) + Send + Sync>;

#[derive(Clone)]
pub struct CompletionNotifier {
    observer: CompletionObserver,
}

impl CompletionNotifier {
    pub fn new(observer: CompletionObserver) -> Self {
        Self { observer }
    }

    pub fn notify(&self, exchange: &CompletedExchange<'_>) {
        let observer = &self.observer;
        if catch_unwind(AssertUnwindSafe(|| observer(exchange))).is_err() {
            warn!(url = %exchange.request.url, "completion observer panicked");
        }
    }
}

impl std::fmt::Debug for CompletionNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionNotifier").finish_non_exhaustive()
    }
}
