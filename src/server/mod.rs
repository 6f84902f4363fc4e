//! HTTP routes for the Devin MCP bridge.
//!
//! `POST /api/mcp/devin` terminates one JSON-RPC exchange against a fresh
//! in-process MCP server; `GET /api/mcp/devin-status` is the trivial
//! availability probe. Nothing here is shared across requests beyond the
//! loaded configuration and the reqwest connection pool.

use crate::api::DevinClient;
use crate::core::config::Config;
use crate::mcp::server::DevinMcpServer;
use crate::mcp::transport::{error_envelope, BufferedResponse, StreamableHttpServerTransport};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{any, get};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

const MISSING_KEY_MESSAGE: &str =
    "Devin API key not configured. Please set DEVIN_API_KEY in your environment.";

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/mcp/devin", any(handle_mcp))
        .route("/api/mcp/devin-status", get(devin_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Reports whether the upstream credential is configured. Performs no
/// upstream call and never includes key material.
async fn devin_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "available": state.config.api_key().is_some() }))
}

async fn handle_mcp(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        let message = if state.config.api_key().is_none() {
            "Devin API key not configured"
        } else {
            "Method not allowed. Use POST for MCP requests."
        };
        return envelope_response(StatusCode::METHOD_NOT_ALLOWED, -32000, message);
    }

    let Some(api_key) = state.config.api_key().map(str::to_string) else {
        error!("DEVIN_API_KEY not configured");
        return envelope_response(StatusCode::INTERNAL_SERVER_ERROR, -32603, MISSING_KEY_MESSAGE);
    };

    match bridge_request(&state, &api_key, &headers, &body).await {
        Ok(response) => response,
        Err(err) => {
            // Adaptation failures are logged server-side only; the client
            // gets a generic envelope with no internal detail.
            error!(error = %err, "Error handling Devin MCP request");
            envelope_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                -32603,
                "Internal server error",
            )
        }
    }
}

async fn bridge_request(
    state: &AppState,
    api_key: &str,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Response, String> {
    let payload: Value = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(_) => {
            return Ok(envelope_response(
                StatusCode::BAD_REQUEST,
                -32700,
                "Parse error",
            ))
        }
    };
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok());

    let client = DevinClient::new(state.http.clone(), state.config.base_url(), api_key);
    let server = DevinMcpServer::new(client);
    let transport = StreamableHttpServerTransport::new();
    let mut buffered = BufferedResponse::new();

    transport
        .handle_request(accept, &payload, &server, &mut buffered)
        .await?;
    // Transport and server are request-scoped; both drop here.
    buffered_to_response(buffered)
}

fn buffered_to_response(buffered: BufferedResponse) -> Result<Response, String> {
    let (status, headers, body) = buffered.into_parts();
    let status = StatusCode::from_u16(status).map_err(|err| err.to_string())?;

    let mut builder = Response::builder().status(status);
    for (name, value) in &headers {
        builder = builder.header(name, value);
    }
    builder
        .body(axum::body::Body::from(body))
        .map_err(|err| err.to_string())
}

fn envelope_response(status: StatusCode, code: i64, message: &str) -> Response {
    (status, Json(error_envelope(code, message, Value::Null))).into_response()
}
