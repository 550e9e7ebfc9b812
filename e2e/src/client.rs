//! HTTP client that simulates how the browser UI talks to the relay

use bytes::Bytes;
use futures::StreamExt;
use reqwest::Client;

use crate::types::{RelayFrame, RelayResponse, StreamingResponse};

/// Build an HTTP client for the tests
pub fn build_client() -> Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to build reqwest client")
}

/// POST a JSON body and parse the JSON answer, whatever its status
pub async fn send_json(
    client: &Client,
    relay_addr: &str,
    path: &str,
    body: serde_json::Value,
) -> anyhow::Result<RelayResponse> {
    let url = format!("http://{relay_addr}{path}");

    let resp = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to send request to relay: {}", e))?;

    read_json(resp).await
}

/// GET a path and parse the answer as JSON when possible
pub async fn send_get(client: &Client, relay_addr: &str, path: &str) -> anyhow::Result<RelayResponse> {
    let url = format!("http://{relay_addr}{path}");

    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to GET {}: {}", url, e))?;

    let status = resp.status().as_u16();
    let body_text = resp.text().await.unwrap_or_default();
    let body = serde_json::from_str(&body_text).unwrap_or(serde_json::Value::String(body_text));

    Ok(RelayResponse { status, body })
}

async fn read_json(resp: reqwest::Response) -> anyhow::Result<RelayResponse> {
    let status = resp.status().as_u16();
    let body_text = resp
        .text()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read relay response: {}", e))?;

    let body: serde_json::Value = serde_json::from_str(&body_text).map_err(|e| {
        anyhow::anyhow!(
            "Relay response is not valid JSON: {}: {}",
            e,
            &body_text[..body_text.len().min(500)]
        )
    })?;

    Ok(RelayResponse { status, body })
}

/// Send a streaming chat request to the relay and collect every frame
pub async fn send_streaming(
    client: &Client,
    relay_addr: &str,
    mut request_body: serde_json::Value,
) -> anyhow::Result<StreamingResponse> {
    request_body["stream"] = serde_json::Value::Bool(true);

    let url = format!("http://{relay_addr}/api/chat");

    let resp = client
        .post(&url)
        .json(&request_body)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to send streaming request to relay: {}", e))?;

    let status = resp.status().as_u16();
    if status != 200 {
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("Relay returned error {}: {}", status, body));
    }

    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let mut stream = resp.bytes_stream();
    let mut all_bytes: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk: Bytes = chunk.map_err(|e| anyhow::anyhow!("Stream read error: {}", e))?;
        all_bytes.extend_from_slice(&chunk);
    }

    let body_text = String::from_utf8_lossy(&all_bytes);
    Ok(StreamingResponse {
        content_type,
        frames: parse_frames(&body_text),
    })
}

/// Split a relay body into frames. Each frame is one `data: ` line
/// followed by a blank line.
fn parse_frames(text: &str) -> Vec<RelayFrame> {
    text.split("\n\n")
        .filter_map(|raw| raw.trim().strip_prefix("data: "))
        .map(|data| RelayFrame {
            data: data.to_string(),
            is_done: data == "[DONE]",
        })
        .collect()
}
