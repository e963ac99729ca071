//! GraphQL-over-HTTP transport with preflight hooks and cancellable sends.
//!
//! # Overview
//! `HttpTransport::send` turns an `Operation` into an HTTP request, lets the
//! caller veto or edit it, performs the round trip on a tokio task, and hands
//! back either the parsed response object or a classified `TransportError`.
//! Every send returns a `Cancellable` immediately.
//!
//! # Design
//! - Request building, preflight, classification and the wire types are
//!   plain synchronous code with no I/O, tested in isolation.
//! - Only `client` touches the network, through `reqwest`.
//! - Hooks and the completion observer are optional closures fixed at
//!   construction, not per send.
//! - `Cancellable` is a two-variant enum so "never sent" is visible to
//!   callers without downcasting.

pub mod cancellable;
pub mod client;
pub mod error;
pub mod http;
pub mod notifier;
pub mod operation;
pub mod preflight;
pub mod request;
pub mod response;

pub use cancellable::{Cancellable, LiveHandle};
pub use client::{HttpTransport, HttpTransportBuilder};
pub use error::{BuildError, HttpResponseError, ResponseErrorKind, TransportError};
pub use crate::http::{HttpMethod, TransportRequest, TransportResponse};
pub use notifier::CompletedExchange;
pub use operation::{GraphQlError, GraphQlResponse, Operation, OperationType};
