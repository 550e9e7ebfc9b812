//! Mock backend server that simulates an LM Studio server
//!
//! Serves the OpenAI-compatible endpoints the relay calls. Tests queue
//! responses via SharedBackendState before each request.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::types::{BackendState, MockResponse, ReceivedRequest, SharedBackendState};

/// Models returned by /v1/models
fn default_models_response() -> &'static str {
    r#"{"object":"list","data":[{"id":"llama-3-8b","object":"model","created":1700000000,"owned_by":"organization_owner"},{"id":"qwen3-14b","object":"model","created":1700000001,"owned_by":"organization_owner"}]}"#
}

/// Fallback when no response is queued
fn default_completion_response() -> MockResponse {
    MockResponse::json(
        r#"{"id":"chatcmpl-default","object":"chat.completion","created":1700000000,"model":"llama-3-8b","choices":[{"index":0,"message":{"role":"assistant","content":"Default response (no mock queued)"},"finish_reason":"stop"}]}"#,
    )
}

/// Handle POST /v1/chat/completions - serves pre-configured mock responses
async fn handle_chat_completions(
    State(state): State<SharedBackendState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    let received = ReceivedRequest {
        path: "/v1/chat/completions".to_string(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body_json,
    };

    let mock_response = {
        let mut state = state.lock().unwrap();
        state.received_requests.push(received);
        state.response_queue.pop_front().unwrap_or_else(default_completion_response)
    };

    Response::builder()
        .status(mock_response.status)
        .header(header::CONTENT_TYPE, &mock_response.content_type)
        .body(Body::from(mock_response.body))
        .unwrap()
        .into_response()
}

/// Handle GET /v1/models
async fn handle_models() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        default_models_response(),
    )
}

/// Start the mock backend server and return the shared state handle
pub async fn start(port: u16) -> anyhow::Result<SharedBackendState> {
    let state: SharedBackendState = std::sync::Arc::new(std::sync::Mutex::new(BackendState::default()));

    let app = Router::new()
        .route("/v1/chat/completions", post(handle_chat_completions))
        .route("/v1/models", get(handle_models))
        .with_state(state.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind mock backend to {}: {}", addr, e))?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock backend server failed");
    });

    // Brief pause to let the server start accepting connections
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    Ok(state)
}

/// Queue the next response for /v1/chat/completions
pub fn queue_response(state: &SharedBackendState, response: MockResponse) {
    state.lock().unwrap().response_queue.push_back(response);
}

/// All requests received since the last drain
pub fn drain_requests(state: &SharedBackendState) -> Vec<ReceivedRequest> {
    let mut s = state.lock().unwrap();
    s.received_requests.drain(..).collect()
}
