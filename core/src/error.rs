//! Error types for the GraphQL HTTP transport.
//!
//! # Design
//! Every failure of a `send` reaches the caller exactly once, as a
//! `TransportError` passed to the completion callback. The variants separate
//! "never left the process" (`CancelledByDeveloper`, `RequestSerialization`)
//! from "cancelled while in flight" (`Cancelled`), "the server answered badly"
//! (`HttpResponse`) and "no answer at all" (`Network`). None of them poison
//! the transport; the next `send` starts from scratch.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

/// Why an HTTP response could not be turned into a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseErrorKind {
    /// The status code was outside the 2xx range.
    ErrorResponse,
    /// The status was 2xx but the body was not a JSON object.
    InvalidResponse,
}

impl ResponseErrorKind {
    pub fn description(&self) -> &'static str {
        match self {
            ResponseErrorKind::ErrorResponse => "Received error response",
            ResponseErrorKind::InvalidResponse => "Received invalid response",
        }
    }
}

/// The server responded, but not with something usable.
#[derive(Debug, Clone, Error)]
#[error("{} (HTTP {status}): {body_description}", .kind.description())]
pub struct HttpResponseError {
    pub kind: ResponseErrorKind,
    pub status: u16,
    pub body: Bytes,
    /// Human-readable rendering of `body`.
    pub body_description: String,
}

/// Errors delivered to a `send` completion callback.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The `should_send` hook vetoed the request. Nothing was transmitted.
    #[error("request was cancelled by the preflight hook")]
    CancelledByDeveloper,

    /// A live request was cancelled through its handle before it finished.
    #[error("request was cancelled")]
    Cancelled,

    #[error(transparent)]
    HttpResponse(#[from] HttpResponseError),

    /// The exchange failed before a response arrived (DNS, connect, I/O).
    #[error("network error: {0}")]
    Network(#[source] Arc<reqwest::Error>),

    /// The operation could not be encoded into a request.
    #[error("failed to serialize request: {0}")]
    RequestSerialization(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl TransportError {
    /// True for both a preflight veto and a live cancellation.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TransportError::CancelledByDeveloper | TransportError::Cancelled)
    }

    pub fn http_response(&self) -> Option<&HttpResponseError> {
        match self {
            TransportError::HttpResponse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(Arc::new(err))
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::RequestSerialization(err.to_string())
    }
}

/// Errors raised while constructing an `HttpTransport`.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("no tokio runtime available; call from within a runtime or supply one")]
    NoRuntime,

    #[error("invalid default header: {0}")]
    InvalidHeader(String),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}
