//! Chat-completions streaming backend
//!
//! Speaks the OpenAI-style `/chat/completions` protocol with `stream: true`.
//! The response body is an SSE byte stream; each `data:` block carries a
//! delta JSON object, and a literal `data: [DONE]` marks the end. Deltas are
//! forwarded as they arrive, so clients see true incremental output.

use crate::config::ProviderConfig;
use crate::error::{Result, ScenegenError};
use crate::prompts::{self, GenerationMode};
use crate::providers::{chat_pacing, FragmentStream, StreamFragment, TextGenerator};
use crate::session::ChatMessage;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Sampling temperature sent with every request
const TEMPERATURE: f64 = 0.8;

/// Streaming generator for chat-completions backends
#[derive(Debug)]
pub struct ChatStreamGenerator {
    config: ProviderConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChatDelta {
    choices: Vec<ChatDeltaChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatDeltaChoice {
    delta: ChatDeltaContent,
}

#[derive(Debug, Deserialize)]
struct ChatDeltaContent {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatStreamGenerator {
    /// Create a generator from provider configuration and a prebuilt client
    pub fn new(config: ProviderConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Build the request, adding app-identification headers for OpenRouter
    fn request(&self, body: &serde_json::Value) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(body);
        if self.config.base_url.contains("openrouter.ai") {
            req = req
                .header("HTTP-Referer", "http://localhost:8000")
                .header("X-Title", "Scenegen");
        }
        req
    }

    fn build_messages(
        &self,
        mode: GenerationMode,
        topic: &str,
        history: &[ChatMessage],
    ) -> Vec<serde_json::Value> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(serde_json::json!({
            "role": "system",
            "content": prompts::build_system_prompt(mode, topic),
        }));
        for msg in history {
            messages.push(serde_json::json!({
                "role": msg.role.to_string(),
                "content": msg.content,
            }));
        }
        messages.push(serde_json::json!({ "role": "user", "content": topic }));
        messages
    }
}

#[async_trait]
impl TextGenerator for ChatStreamGenerator {
    async fn stream(
        &self,
        mode: GenerationMode,
        topic: &str,
        history: &[ChatMessage],
    ) -> Result<FragmentStream> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": self.build_messages(mode, topic, history),
            "stream": true,
            "temperature": TEMPERATURE,
        });

        let response = self
            .request(&body)
            .send()
            .await
            .map_err(|e| ScenegenError::Provider(format!("Chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ScenegenError::Provider(format!(
                "Chat request rejected with status {}: {}",
                status, detail
            ))
            .into());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let pacing = chat_pacing(mode);
        tokio::spawn(parse_delta_stream(response.bytes_stream(), tx, pacing));
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": TEMPERATURE,
        });

        // Non-streaming call, so the whole request gets the total deadline.
        let response = self
            .request(&body)
            .timeout(std::time::Duration::from_secs(
                self.config.request_timeout_seconds,
            ))
            .send()
            .await
            .map_err(|e| ScenegenError::Provider(format!("Chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ScenegenError::Provider(format!(
                "Chat request rejected with status {}: {}",
                status, detail
            ))
            .into());
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| ScenegenError::Provider(format!("Invalid chat response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ScenegenError::EmptyResult.into())
    }

    fn name(&self) -> &'static str {
        "chat-completions"
    }
}

/// Parse an SSE byte stream of chat deltas into fragments
///
/// Events are separated by blank lines; only `data:` fields matter here. A
/// literal `[DONE]` data value ends the stream and produces the terminal
/// fragment. A transport fault closes the channel without one, which the
/// caller treats as an abrupt termination.
///
/// Buffering happens on raw bytes: transport chunk boundaries can land in
/// the middle of a multi-byte codepoint, so decoding is deferred until a
/// complete `\n\n`-delimited event block is available.
async fn parse_delta_stream(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>>,
    tx: mpsc::UnboundedSender<StreamFragment>,
    pacing: Option<std::time::Duration>,
) {
    use futures::StreamExt;

    // Buffer accumulates raw bytes between `\n\n` boundaries.
    let mut buffer: Vec<u8> = Vec::new();

    tokio::pin!(byte_stream);

    while let Some(chunk_result) = byte_stream.next().await {
        let chunk = match chunk_result {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Chat stream transport fault: {}", e);
                return;
            }
        };

        buffer.extend_from_slice(&chunk);

        // SSE events are separated by blank lines (`\n\n`).
        while let Some(pos) = find_block_boundary(&buffer) {
            let block: Vec<u8> = buffer.drain(..pos + 2).collect();
            let event_block = match std::str::from_utf8(&block[..pos]) {
                Ok(s) => s,
                Err(_) => continue,
            };
            if process_delta_block(event_block, &tx, pacing).await {
                return;
            }
        }
    }
    // Upstream closed without [DONE]; the channel drops without a terminal
    // fragment and the orchestrator reports the abrupt end.
}

/// Position of the first `\n\n` event delimiter in the buffer
fn find_block_boundary(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|window| window == b"\n\n")
}

/// Handle one SSE event block; returns true when the stream is finished
async fn process_delta_block(
    event_block: &str,
    tx: &mpsc::UnboundedSender<StreamFragment>,
    pacing: Option<std::time::Duration>,
) -> bool {
    for line in event_block.lines() {
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();

        if data == "[DONE]" {
            let _ = tx.send(StreamFragment::Done);
            return true;
        }

        let delta: ChatDelta = match serde_json::from_str(data) {
            Ok(d) => d,
            Err(_) => continue,
        };

        let token = delta
            .choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .unwrap_or("");
        if token.is_empty() {
            continue;
        }

        if tx.send(StreamFragment::Token(token.to_string())).is_err() {
            return true;
        }
        if let Some(delay) = pacing {
            tokio::time::sleep(delay).await;
        }
    }
    false
}
