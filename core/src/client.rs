//! The GraphQL HTTP transport.
//!
//! # Design
//! `HttpTransport` owns no per-request state. Each `send` builds a request,
//! runs the preflight hooks on the caller's stack, and either resolves
//! immediately (veto or unencodable operation, `Cancellable::Inert`) or spawns
//! exactly one task on the configured tokio runtime (`Cancellable::Live`).
//! The task races the exchange against the handle's cancel signal, reports the
//! raw artifacts to the completion observer, then classifies and invokes the
//! caller's completion. The completion is `FnOnce`, so every send resolves it
//! exactly once.

use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::runtime::Handle;
use tracing::{debug, trace};
use url::Url;

use crate::cancellable::{Cancellable, LiveHandle};
use crate::error::{BuildError, TransportError};
use crate::http::{TransportRequest, TransportResponse};
use crate::notifier::{CompletedExchange, CompletionNotifier, CompletionObserver};
use crate::operation::{GraphQlResponse, Operation};
use crate::preflight::{Preflight, PreflightOutcome, ShouldSend, WillSend};
use crate::request::RequestBuilder;
use crate::response::classify;

/// Builder for an `HttpTransport`.
pub struct HttpTransportBuilder {
    endpoint: String,
    use_get_for_queries: bool,
    send_operation_identifiers: bool,
    should_send: Option<ShouldSend>,
    will_send: Option<WillSend>,
    observer: Option<CompletionObserver>,
    default_headers: Vec<(String, String)>,
    client: Option<reqwest::Client>,
    runtime: Option<Handle>,
}

impl HttpTransportBuilder {
    fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            use_get_for_queries: false,
            send_operation_identifiers: false,
            should_send: None,
            will_send: None,
            observer: None,
            default_headers: Vec::new(),
            client: None,
            runtime: None,
        }
    }

    /// Send queries as `GET` with the operation in the query string.
    pub fn use_get_for_queries(mut self, enabled: bool) -> Self {
        self.use_get_for_queries = enabled;
        self
    }

    /// Send the persisted operation identifier instead of the document.
    pub fn send_operation_identifiers(mut self, enabled: bool) -> Self {
        self.send_operation_identifiers = enabled;
        self
    }

    /// Veto hook. Without one every request is sent.
    pub fn should_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TransportRequest) -> bool + Send + Sync + 'static,
    {
        self.should_send = Some(Arc::new(hook));
        self
    }

    /// Mutation hook, run after `should_send` approved the request. Headers it
    /// sets take precedence over the defaults.
    pub fn will_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut TransportRequest) + Send + Sync + 'static,
    {
        self.will_send = Some(Arc::new(hook));
        self
    }

    /// Observer told about the raw artifacts of every real network attempt.
    pub fn on_request_completed<F>(mut self, observer: F) -> Self
    where
        F: Fn(&CompletedExchange<'_>) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Header added to every request before preflight.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Use a preconfigured client. TLS, proxies and timeouts belong there.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Runtime request tasks are spawned on. Defaults to the runtime
    /// `build` is called from.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Result<HttpTransport, BuildError> {
        let endpoint = Url::parse(&self.endpoint)?;

        let mut headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| BuildError::InvalidHeader(e.to_string()))?;
            let value = HeaderValue::from_str(value).map_err(|e| BuildError::InvalidHeader(e.to_string()))?;
            headers.insert(name, value);
        }

        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| BuildError::NoRuntime)?,
        };
        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder().build()?,
        };

        Ok(HttpTransport {
            requests: RequestBuilder::new(endpoint)
                .use_get_for_queries(self.use_get_for_queries)
                .send_operation_identifiers(self.send_operation_identifiers)
                .default_headers(headers),
            preflight: Preflight::new(self.should_send, self.will_send),
            notifier: self.observer.map(CompletionNotifier::new),
            client,
            runtime,
        })
    }
}

/// Sends GraphQL operations to a single endpoint over HTTP.
#[derive(Clone)]
pub struct HttpTransport {
    requests: RequestBuilder,
    preflight: Preflight,
    notifier: Option<CompletionNotifier>,
    client: reqwest::Client,
    runtime: Handle,
}

impl HttpTransport {
    pub fn builder(endpoint: impl Into<String>) -> HttpTransportBuilder {
        HttpTransportBuilder::new(endpoint)
    }

    pub fn endpoint(&self) -> &Url {
        self.requests.endpoint()
    }

    /// Send `operation` and deliver the outcome to `completion`.
    ///
    /// Returns before any network I/O resolves. When the request is vetoed or
    /// cannot be encoded, `completion` has already run by the time this
    /// returns and the handle is `Cancellable::Inert`.
    pub fn send<O, F>(&self, operation: &O, completion: F) -> Cancellable
    where
        O: Operation,
        F: FnOnce(Result<GraphQlResponse, TransportError>) + Send + 'static,
    {
        let name = operation.operation_name();

        let request = match self.requests.build(operation) {
            Ok(request) => request,
            Err(err) => {
                debug!(operation = name, error = %err, "failed to build request");
                completion(Err(err));
                return Cancellable::Inert;
            }
        };
        trace!(operation = name, method = request.method.as_str(), url = %request.url, "built request");

        let request = match self.preflight.run(request) {
            PreflightOutcome::Send(request) => Arc::new(request),
            PreflightOutcome::Vetoed => {
                debug!(operation = name, "request vetoed by preflight hook");
                completion(Err(TransportError::CancelledByDeveloper));
                return Cancellable::Inert;
            }
        };

        let (handle, cancel_rx) = LiveHandle::new(Arc::clone(&request));
        let task = handle.clone();
        let completion = Completion::new(handle.clone(), completion);
        let client = self.client.clone();
        let notifier = self.notifier.clone();
        let operation = name.to_string();

        debug!(%operation, method = request.method.as_str(), "spawning request task");
        self.runtime.spawn(async move {
            let outcome = tokio::select! {
                biased;
                Ok(()) = cancel_rx => Err(TransportError::Cancelled),
                result = execute(&client, &request) => {
                    if task.complete() {
                        result.map_err(TransportError::from)
                    } else {
                        Err(TransportError::Cancelled)
                    }
                }
            };

            if let Some(notifier) = &notifier {
                notifier.notify(&exchange(&request, &outcome));
            }

            let result = outcome.and_then(classify);
            match &result {
                Ok(response) => debug!(%operation, status = response.response.status, "request succeeded"),
                Err(err) => debug!(%operation, error = %err, "request failed"),
            }
            completion.resolve(result);
        });

        Cancellable::Live(handle)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("requests", &self.requests)
            .field("preflight", &self.preflight)
            .field("notifier", &self.notifier.is_some())
            .finish()
    }
}

/// Owns a live send's completion. If the request task is dropped before it
/// resolves (the runtime shut down mid-flight), the completion still fires
/// once, with `TransportError::Cancelled`.
struct Completion<F>
where
    F: FnOnce(Result<GraphQlResponse, TransportError>),
{
    handle: LiveHandle,
    callback: Option<F>,
}

impl<F> Completion<F>
where
    F: FnOnce(Result<GraphQlResponse, TransportError>),
{
    fn new(handle: LiveHandle, callback: F) -> Self {
        Self {
            handle,
            callback: Some(callback),
        }
    }

    fn resolve(mut self, result: Result<GraphQlResponse, TransportError>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<F> Drop for Completion<F>
where
    F: FnOnce(Result<GraphQlResponse, TransportError>),
{
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            self.handle.complete();
            debug!(url = %self.handle.request().url, "request task dropped before resolving");
            callback(Err(TransportError::Cancelled));
        }
    }
}

fn exchange<'a>(
    request: &'a TransportRequest,
    outcome: &'a Result<TransportResponse, TransportError>,
) -> CompletedExchange<'a> {
    match outcome {
        Ok(response) => CompletedExchange {
            request,
            data: Some(&response.body),
            response: Some(response),
            error: None,
        },
        Err(error) => CompletedExchange {
            request,
            data: None,
            response: None,
            error: Some(error),
        },
    }
}

/// Perform the round trip. Non-2xx statuses are responses, not errors.
async fn execute(
    client: &reqwest::Client,
    request: &TransportRequest,
) -> Result<TransportResponse, reqwest::Error> {
    let mut builder = client
        .request(request.method.into(), request.url.clone())
        .headers(request.headers.clone());
    if let Some(body) = &request.body {
        builder = builder.body(body.clone());
    }

    let response = builder.send().await?;
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response.bytes().await?;

    Ok(TransportResponse {
        status,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::operation::OperationType;

    struct HeroName;

    impl Operation for HeroName {
        type Variables = ();

        fn operation_type(&self) -> OperationType {
            OperationType::Query
        }

        fn operation_name(&self) -> &str {
            "HeroName"
        }

        fn document(&self) -> &str {
            "query HeroName { hero { name } }"
        }

        fn variables(&self) -> Option<&()> {
            None
        }
    }

    #[test]
    fn build_outside_runtime_fails() {
        let err = HttpTransport::builder("http://localhost:8080/graphql").build().unwrap_err();
        assert!(matches!(err, BuildError::NoRuntime));
    }

    #[test]
    fn build_rejects_bad_url() {
        let err = HttpTransport::builder("not a url").build().unwrap_err();
        assert!(matches!(err, BuildError::InvalidUrl(_)));
    }

    #[test]
    fn build_rejects_bad_default_header() {
        let err = HttpTransport::builder("http://localhost:8080/graphql")
            .default_header("bad header", "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidHeader(_)));
    }

    #[tokio::test]
    async fn veto_resolves_synchronously_with_inert_handle() {
        let observed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&observed);
        let transport = HttpTransport::builder("http://localhost:1/graphql")
            .use_get_for_queries(true)
            .should_send(|_| false)
            .on_request_completed(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        let outcome = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&outcome);
        let handle = transport.send(&HeroName, move |result| {
            *slot.lock().unwrap() = Some(result);
        });

        assert!(handle.is_inert());
        handle.cancel();
        let result = outcome.lock().unwrap().take().expect("completion ran before send returned");
        assert!(matches!(result, Err(TransportError::CancelledByDeveloper)));
        assert_eq!(observed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropped_completion_fires_cancelled_once() {
        let request = Arc::new(TransportRequest {
            method: crate::http::HttpMethod::Post,
            url: Url::parse("http://localhost:8080/graphql").unwrap(),
            headers: HeaderMap::new(),
            body: None,
        });
        let (handle, _rx) = LiveHandle::new(request);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let completion = Completion::new(handle.clone(), move |result| {
            assert!(matches!(result, Err(TransportError::Cancelled)));
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(completion);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!handle.is_pending());
    }

    #[test]
    fn resolved_completion_does_not_fire_again_on_drop() {
        let request = Arc::new(TransportRequest {
            method: crate::http::HttpMethod::Post,
            url: Url::parse("http://localhost:8080/graphql").unwrap(),
            headers: HeaderMap::new(),
            body: None,
        });
        let (handle, _rx) = LiveHandle::new(request);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let completion = Completion::new(handle, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        completion.resolve(Err(TransportError::Cancelled));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn live_handle_exposes_mutated_request() {
        let transport = HttpTransport::builder("http://localhost:1/graphql")
            .default_header("Authorization", "Bearer default")
            .will_send(|req| {
                req.set_header("authorization", "Bearer X").unwrap();
            })
            .build()
            .unwrap();

        let handle = transport.send(&HeroName, |_| {});
        let live = handle.as_live().expect("send proceeded");
        assert_eq!(live.request().header("Authorization"), Some("Bearer X"));
        handle.cancel();
    }
}
