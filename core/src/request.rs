//! Turns an `Operation` into a `TransportRequest`.
//!
//! Queries go out as `GET` with the operation encoded in the query string
//! when `use_get_for_queries` is set; everything else is a `POST` with a JSON
//! body carrying `query`, `operationName` and `variables`.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use url::Url;

use crate::error::TransportError;
use crate::http::{HttpMethod, TransportRequest};
use crate::operation::{Operation, OperationType};

const JSON: &str = "application/json";
// GET requests have no body; the content type names how the operation is
// encoded in the query string.
const FORM: &str = "application/x-www-form-urlencoded";

#[derive(Serialize)]
struct RequestBody<'a, V> {
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a V>,
}

/// Stateless request builder bound to one endpoint.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    endpoint: Url,
    use_get_for_queries: bool,
    send_operation_identifiers: bool,
    default_headers: HeaderMap,
}

impl RequestBuilder {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            use_get_for_queries: false,
            send_operation_identifiers: false,
            default_headers: HeaderMap::new(),
        }
    }

    pub fn use_get_for_queries(mut self, enabled: bool) -> Self {
        self.use_get_for_queries = enabled;
        self
    }

    pub fn send_operation_identifiers(mut self, enabled: bool) -> Self {
        self.send_operation_identifiers = enabled;
        self
    }

    /// Headers added to every request after the content headers, so they may
    /// override them.
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn build<O: Operation>(&self, operation: &O) -> Result<TransportRequest, TransportError> {
        let body = self.body(operation)?;

        if self.use_get_for_queries && operation.operation_type() == OperationType::Query {
            self.build_get(&body)
        } else {
            self.build_post(&body)
        }
    }

    fn body<'a, O: Operation>(
        &self,
        operation: &'a O,
    ) -> Result<RequestBody<'a, O::Variables>, TransportError> {
        let (query, id) = if self.send_operation_identifiers {
            let id = operation.operation_identifier().ok_or_else(|| {
                TransportError::RequestSerialization(format!(
                    "operation {} has no identifier",
                    operation.operation_name()
                ))
            })?;
            (None, Some(id))
        } else {
            (Some(operation.document()), None)
        };

        Ok(RequestBody {
            query,
            id,
            operation_name: operation.operation_name(),
            variables: operation.variables(),
        })
    }

    fn build_get<V: Serialize>(&self, body: &RequestBody<'_, V>) -> Result<TransportRequest, TransportError> {
        let variables = body.variables.map(serde_json::to_string).transpose()?;

        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("operationName", body.operation_name);
            if let Some(query) = body.query {
                pairs.append_pair("query", query);
            }
            if let Some(id) = body.id {
                pairs.append_pair("id", id);
            }
            if let Some(variables) = &variables {
                pairs.append_pair("variables", variables);
            }
        }

        Ok(TransportRequest {
            method: HttpMethod::Get,
            url,
            headers: self.headers(FORM),
            body: None,
        })
    }

    fn build_post<V: Serialize>(&self, body: &RequestBody<'_, V>) -> Result<TransportRequest, TransportError> {
        let encoded = serde_json::to_vec(body)?;
        Ok(TransportRequest {
            method: HttpMethod::Post,
            url: self.endpoint.clone(),
            headers: self.headers(JSON),
            body: Some(Bytes::from(encoded)),
        })
    }

    fn headers(&self, content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        for (name, value) in &self.default_headers {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}
