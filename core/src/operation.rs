//! The operation abstraction the transport sends, and the parsed result it
//! hands back.
//!
//! # Design
//! An `Operation` is owned by the caller and never mutated by the transport.
//! Variables are a typed `Serialize` value so a malformed set surfaces as a
//! request-serialization error at build time instead of a bad wire payload.
//! Decoding `data` into domain types is left to callers through
//! `GraphQlResponse::decode_data`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::TransportResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

/// A GraphQL query or mutation.
pub trait Operation {
    type Variables: Serialize;

    fn operation_type(&self) -> OperationType;

    fn operation_name(&self) -> &str;

    /// The full query or mutation document.
    fn document(&self) -> &str;

    /// Identifier registered with the server for persisted queries.
    fn operation_identifier(&self) -> Option<&str> {
        None
    }

    fn variables(&self) -> Option<&Self::Variables>;
}

/// A single entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<Value>>,
    #[serde(default)]
    pub extensions: Option<Map<String, Value>>,
}

/// A successful exchange: the parsed body object plus the raw response.
#[derive(Debug, Clone)]
pub struct GraphQlResponse {
    pub body: Map<String, Value>,
    pub response: TransportResponse,
}

impl GraphQlResponse {
    pub fn data(&self) -> Option<&Value> {
        self.body.get("data").filter(|data| !data.is_null())
    }

    /// Entries of the `errors` array. Entries that are not well-formed
    /// GraphQL errors are skipped.
    pub fn errors(&self) -> Vec<GraphQlError> {
        self.body
            .get("errors")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Decode `data` into `T`. Returns `Ok(None)` when the response carries
    /// no data.
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.data()
            .map(|data| serde_json::from_value(data.clone()))
            .transpose()
    }
}
