use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

/// Persisted-query identifier the server recognises for `HeroName`.
pub const HERO_NAME_ID: &str = "f6e76545cd03aa21368d9969cb39447f6e836a16717823281803778e7805d671";

/// How long `/slow` holds a request before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(10);

/// A GraphQL request as sent in a POST body.
#[derive(Debug, Deserialize)]
pub struct GraphQlRequest {
    pub query: Option<String>,
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
    pub id: Option<String>,
}

/// A GraphQL request as sent in a GET query string. `variables` arrives as a
/// JSON-encoded string.
#[derive(Debug, Deserialize)]
pub struct GraphQlQueryParams {
    pub query: Option<String>,
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,
    pub variables: Option<String>,
    pub id: Option<String>,
}

impl GraphQlQueryParams {
    fn into_request(self) -> Result<GraphQlRequest, String> {
        let variables = match self.variables.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                serde_json::from_str::<Map<String, Value>>(raw)
                    .map_err(|e| format!("variables must be a JSON object: {e}"))?,
            ),
        };
        Ok(GraphQlRequest {
            query: self.query,
            operation_name: self.operation_name,
            variables,
            id: self.id,
        })
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/graphql", get(graphql_get).post(graphql_post))
        .route("/status/{code}", get(status).post(status))
        .route("/slow", get(slow).post(slow))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn graphql_get(Query(params): Query<GraphQlQueryParams>) -> (StatusCode, Json<Value>) {
    match params.into_request() {
        Ok(request) => execute(request),
        Err(message) => bad_request(&message),
    }
}

async fn graphql_post(Json(request): Json<GraphQlRequest>) -> (StatusCode, Json<Value>) {
    execute(request)
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, format!("status {}", status.as_u16()))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({ "data": null }))
}

fn execute(request: GraphQlRequest) -> (StatusCode, Json<Value>) {
    match (&request.query, &request.id) {
        (None, None) => return bad_request("request must carry a query or a persisted query id"),
        (None, Some(id)) if id != HERO_NAME_ID => {
            return graphql_errors("PersistedQueryNotFound");
        }
        _ => {}
    }

    match request.operation_name.as_deref() {
        Some("HeroName") => {
            let episode = request
                .variables
                .as_ref()
                .and_then(|vars| vars.get("episode"))
                .and_then(Value::as_str);
            let (typename, name) = hero(episode);
            (
                StatusCode::OK,
                Json(json!({ "data": { "hero": { "__typename": typename, "name": name } } })),
            )
        }
        Some(other) => graphql_errors(&format!("Unknown operation named \"{other}\".")),
        None => bad_request("operationName is required"),
    }
}

fn hero(episode: Option<&str>) -> (&'static str, &'static str) {
    match episode {
        Some("EMPIRE") => ("Human", "Luke Skywalker"),
        _ => ("Droid", "R2-D2"),
    }
}

fn graphql_errors(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "errors": [{ "message": message }] })))
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "errors": [{ "message": message }] })))
}
