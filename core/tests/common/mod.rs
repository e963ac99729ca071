//! Shared fixtures for the transport integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use gql_transport::{
    CompletedExchange, GraphQlResponse, HttpTransport, Operation, OperationType, TransportError,
};
use tokio::sync::oneshot;

pub const HERO_NAME_DOCUMENT: &str =
    "query HeroName($episode: Episode) { hero(episode: $episode) { __typename name } }";

/// The `HeroName` query, optionally for a given episode.
#[derive(Default)]
pub struct HeroNameQuery {
    variables: Option<BTreeMap<&'static str, &'static str>>,
}

impl HeroNameQuery {
    pub fn new() -> Self {
        Self { variables: None }
    }

    pub fn episode(episode: &'static str) -> Self {
        Self {
            variables: Some(BTreeMap::from([("episode", episode)])),
        }
    }
}

impl Operation for HeroNameQuery {
    type Variables = BTreeMap<&'static str, &'static str>;

    fn operation_type(&self) -> OperationType {
        OperationType::Query
    }

    fn operation_name(&self) -> &str {
        "HeroName"
    }

    fn document(&self) -> &str {
        HERO_NAME_DOCUMENT
    }

    fn operation_identifier(&self) -> Option<&str> {
        Some(mock_server::HERO_NAME_ID)
    }

    fn variables(&self) -> Option<&Self::Variables> {
        self.variables.as_ref()
    }
}

/// Raw artifacts captured by the completion observer.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub authorization: Option<String>,
    pub data: Option<Vec<u8>>,
    pub status: Option<u16>,
    pub error: Option<String>,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Recorder {
    entries: Arc<Mutex<Vec<Recorded>>>,
}

impl Recorder {
    pub fn observe(&self) -> impl Fn(&CompletedExchange<'_>) + Send + Sync + 'static {
        let entries = Arc::clone(&self.entries);
        move |exchange: &CompletedExchange<'_>| {
            entries.lock().unwrap().push(Recorded {
                authorization: exchange.request.header("authorization").map(str::to_string),
                data: exchange.data.map(|data| data.to_vec()),
                status: exchange.response.map(|response| response.status),
                error: exchange.error.map(|error| error.to_string()),
                cancelled: exchange.error.is_some_and(TransportError::is_cancellation),
            });
        }
    }

    pub fn entries(&self) -> Vec<Recorded> {
        self.entries.lock().unwrap().clone()
    }
}

/// Start the mock GraphQL server on a random port.
pub async fn start_mock_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    addr
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub type Outcome = Result<GraphQlResponse, TransportError>;

/// Send an operation and wait for its completion callback.
pub async fn send_and_wait<O: Operation>(transport: &HttpTransport, operation: &O) -> Outcome {
    let (tx, rx) = oneshot::channel();
    transport.send(operation, move |result| {
        let _ = tx.send(result);
    });
    rx.await.expect("completion callback dropped")
}

pub fn hero_name(response: &GraphQlResponse) -> Option<&str> {
    response.body.get("data")?.get("hero")?.get("name")?.as_str()
}

/// Start the mock server on its own thread and runtime, so it outlives any
/// runtime the test builds and tears down.
pub fn start_mock_server_thread() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}
