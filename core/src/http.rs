//! HTTP request and response values exchanged with the transport.
//!
//! # Design
//! `TransportRequest` is plain data built by the request builder and edited
//! in place by the `will_send` hook. Once handed to the executor it is frozen
//! and only observable through shared references. Headers live in an
//! `http::HeaderMap`, which gives case-insensitive keys, so a hook setting
//! `authorization` replaces a default `Authorization`.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// A request described as plain data, ready to be transmitted.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl TransportRequest {
    /// Insert or overwrite a header.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), TransportError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidHeader(e.to_string()))?;
        let value =
            HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader(e.to_string()))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Remove a header, returning its previous value if it was present and
    /// valid UTF-8.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers
            .remove(name)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// A response received from the network. Only exists when a round trip
/// actually happened.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TransportRequest {
        TransportRequest {
            method: HttpMethod::Post,
            url: Url::parse("http://localhost:8080/graphql").unwrap(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[test]
    fn set_header_overwrites_case_insensitively() {
        let mut req = request();
        req.set_header("Content-Type", "application/json").unwrap();
        req.set_header("content-type", "text/plain").unwrap();
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn set_header_rejects_invalid_name() {
        let mut req = request();
        let err = req.set_header("bad header", "x").unwrap_err();
        assert!(matches!(err, TransportError::InvalidHeader(_)));
    }

    #[test]
    fn remove_header_returns_previous_value() {
        let mut req = request();
        req.set_header("Authorization", "Bearer X").unwrap();
        assert_eq!(req.remove_header("authorization").as_deref(), Some("Bearer X"));
        assert!(req.header("Authorization").is_none());
        assert!(req.remove_header("authorization").is_none());
    }

    #[test]
    fn response_success_range() {
        let mut resp = TransportResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        assert!(resp.is_success());
        resp.status = 299;
        assert!(resp.is_success());
        resp.status = 300;
        assert!(!resp.is_success());
        resp.status = 199;
        assert!(!resp.is_success());
    }
}
