//! The handle returned by every `send`.
//!
//! # Design
//! `Cancellable` is a closed enum rather than a trait object so callers can
//! tell a request that never touched the network (`Inert`) from one that did
//! (`Live`) with a plain `match`. A live handle owns the sending half of a
//! oneshot channel that the request task races against the exchange; taking
//! the sender out of its slot is what makes `cancel` idempotent and a no-op
//! once the task has resolved.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::http::TransportRequest;

/// Token returned by `HttpTransport::send`.
#[derive(Debug, Clone)]
pub enum Cancellable {
    /// The outcome was decided before any I/O; `cancel` does nothing.
    Inert,
    /// A request task is (or was) in flight.
    Live(LiveHandle),
}

impl Cancellable {
    /// Request cancellation. Safe to call any number of times, on either
    /// variant, before or after completion.
    pub fn cancel(&self) {
        if let Cancellable::Live(handle) = self {
            handle.cancel();
        }
    }

    pub fn is_inert(&self) -> bool {
        matches!(self, Cancellable::Inert)
    }

    pub fn as_live(&self) -> Option<&LiveHandle> {
        match self {
            Cancellable::Live(handle) => Some(handle),
            Cancellable::Inert => None,
        }
    }
}

/// Cancellation capability scoped to one request task.
///
/// Cancellation is eventual: `cancel` returns before the completion callback
/// has necessarily run.
#[derive(Debug, Clone)]
pub struct LiveHandle {
    request: Arc<TransportRequest>,
    cancel_tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl LiveHandle {
    pub(crate) fn new(request: Arc<TransportRequest>) -> (Self, oneshot::Receiver<()>) {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let handle = Self {
            request,
            cancel_tx: Arc::new(Mutex::new(Some(cancel_tx))),
        };
        (handle, cancel_rx)
    }

    /// Returns `true` if the cancellation signal was delivered, `false` if
    /// the request already finished or was already cancelled.
    pub fn cancel(&self) -> bool {
        match self.cancel_tx.lock().take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.cancel_tx.lock().is_some()
    }

    /// The request as transmitted, after the `will_send` hook ran.
    pub fn request(&self) -> &TransportRequest {
        &self.request
    }

    /// Marks the request resolved. Returns `false` if `cancel` got there
    /// first, in which case the outcome must be reported as cancelled.
    pub(crate) fn complete(&self) -> bool {
        self.cancel_tx.lock().take().is_some()
    }
}
