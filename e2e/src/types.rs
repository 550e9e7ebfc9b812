//! Shared types for the e2e test framework

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A mock response the backend will serve for the next request to /v1/chat/completions
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub content_type: String,
}

impl MockResponse {
    /// A non-streaming chat completion
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            content_type: "application/json".to_string(),
        }
    }

    /// A streaming completion; `frames` are written back to back
    pub fn sse(frames: &[String]) -> Self {
        Self {
            status: 200,
            body: frames.concat(),
            content_type: "text/event-stream".to_string(),
        }
    }

    pub fn error(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: "application/json".to_string(),
        }
    }
}

/// Shared state for the mock backend server
#[derive(Debug, Default)]
pub struct BackendState {
    /// Tests push responses, the backend pops and serves them
    pub response_queue: VecDeque<MockResponse>,
    /// All requests received by the backend (for inspection)
    pub received_requests: Vec<ReceivedRequest>,
}

/// A request received by the mock backend
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

pub type SharedBackendState = Arc<Mutex<BackendState>>;

/// One frame of the relay wire format
#[derive(Debug, Clone)]
pub struct RelayFrame {
    pub data: String,
    pub is_done: bool,
}

impl RelayFrame {
    pub fn parse_json(&self) -> anyhow::Result<serde_json::Value> {
        serde_json::from_str(&self.data).map_err(|e| anyhow::anyhow!("Frame JSON parse error: {}: {}", e, self.data))
    }
}

/// A JSON response from the relay
#[derive(Debug)]
pub struct RelayResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl RelayResponse {
    /// Get a nested field using dot notation (e.g. "choices.0.message.content")
    pub fn get(&self, path: &str) -> Option<&serde_json::Value> {
        let mut current = &self.body;
        for part in path.split('.') {
            current = if let Ok(idx) = part.parse::<usize>() {
                current.as_array()?.get(idx)?
            } else {
                current.as_object()?.get(part)?
            };
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_str()
    }
}

/// A streamed chat reply from the relay
#[derive(Debug)]
pub struct StreamingResponse {
    pub content_type: String,
    pub frames: Vec<RelayFrame>,
}

impl StreamingResponse {
    pub fn has_done_marker(&self) -> bool {
        self.frames.last().map(|f| f.is_done).unwrap_or(false)
    }

    /// All frames except the terminal sentinel
    pub fn events(&self) -> Vec<&RelayFrame> {
        self.frames.iter().filter(|f| !f.is_done).collect()
    }

    fn accumulate(&self, field: &str) -> String {
        let mut result = String::new();
        for frame in self.events() {
            if let Ok(json) = frame.parse_json() {
                if let Some(delta) = json.get(field).and_then(|v| v.as_str()) {
                    result.push_str(delta);
                }
            }
        }
        result
    }

    pub fn accumulated_content(&self) -> String {
        self.accumulate("content")
    }

    pub fn accumulated_reasoning(&self) -> String {
        self.accumulate("reasoning")
    }
}

/// Result of a single test case
#[derive(Debug)]
#[allow(dead_code)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}
