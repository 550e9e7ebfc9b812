//! Common test helpers and JSON builders

use serde_json::{json, Value};

// ─── Request builders ────────────────────────────────────────────────────────

/// Build a relay chat request as the browser sends it
pub fn chat_request(prompt: &str, stream: bool) -> Value {
    json!({
        "model": "llama-3-8b",
        "messages": [{"role": "user", "content": prompt}],
        "stream": stream
    })
}

// ─── Response builders ────────────────────────────────────────────────────────

/// One upstream SSE chunk carrying `delta`
pub fn upstream_delta(delta: Value) -> String {
    let chunk = json!({
        "id": "chatcmpl-e2e",
        "object": "chat.completion.chunk",
        "created": 1700000000,
        "model": "llama-3-8b",
        "choices": [{"index": 0, "delta": delta, "finish_reason": null}]
    });
    format!("data: {}\n\n", chunk)
}

pub fn upstream_done() -> String {
    "data: [DONE]\n\n".to_string()
}

/// Upstream stream of plain content deltas, role chunk first
pub fn upstream_content_stream(parts: &[&str]) -> Vec<String> {
    let mut frames = vec![upstream_delta(json!({"role": "assistant", "content": ""}))];
    frames.extend(parts.iter().map(|p| upstream_delta(json!({"content": p}))));
    frames.push(upstream_done());
    frames
}

/// Non-streaming completion whose message carries `reasoning_field`
pub fn upstream_completion_with_reasoning(content: &str, reasoning_field: &str, reasoning: &str) -> String {
    let mut message = serde_json::Map::new();
    message.insert("role".to_string(), json!("assistant"));
    message.insert("content".to_string(), json!(content));
    message.insert(reasoning_field.to_string(), json!(reasoning));

    json!({
        "id": "chatcmpl-e2e",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "qwen3-14b",
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}]
    })
    .to_string()
}

// ─── Assertion helpers ────────────────────────────────────────────────────────

/// Assert two strings are equal, with context on failure
pub fn assert_eq_str(actual: &str, expected: &str, label: &str) -> anyhow::Result<()> {
    if actual != expected {
        Err(anyhow::anyhow!("{label}: expected {:?} but got {:?}", expected, actual))
    } else {
        Ok(())
    }
}

/// Assert condition is true, with message
pub fn assert_true(cond: bool, msg: &str) -> anyhow::Result<()> {
    if !cond {
        Err(anyhow::anyhow!("{}", msg))
    } else {
        Ok(())
    }
}

/// Upstream URL on a local port nothing listens on
pub fn dead_upstream_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/v1")
}
