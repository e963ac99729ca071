//! Turns a raw `TransportResponse` into a `GraphQlResponse` or an
//! `HttpResponseError`.

use serde_json::{Map, Value};

use crate::error::{HttpResponseError, ResponseErrorKind, TransportError};
use crate::http::TransportResponse;
use crate::operation::GraphQlResponse;

const MAX_DESCRIPTION_LEN: usize = 4096;

pub fn classify(response: TransportResponse) -> Result<GraphQlResponse, TransportError> {
    if !response.is_success() {
        return Err(response_error(ResponseErrorKind::ErrorResponse, response));
    }

    match serde_json::from_slice::<Map<String, Value>>(&response.body) {
        Ok(body) => Ok(GraphQlResponse { body, response }),
        Err(_) => Err(response_error(ResponseErrorKind::InvalidResponse, response)),
    }
}

fn response_error(kind: ResponseErrorKind, response: TransportResponse) -> TransportError {
    HttpResponseError {
        kind,
        status: response.status,
        body_description: describe_body(&response.body),
        body: response.body,
    }
    .into()
}

/// Render a body for humans: the UTF-8 text, truncated at a char boundary.
pub fn describe_body(body: &[u8]) -> String {
    if body.is_empty() {
        return "Empty response body".to_string();
    }
    let Ok(text) = std::str::from_utf8(body) else {
        return "Unreadable response body".to_string();
    };
    if text.len() <= MAX_DESCRIPTION_LEN {
        return text.to_string();
    }
    let mut end = MAX_DESCRIPTION_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
