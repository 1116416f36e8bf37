//! Single-shot generate backend
//!
//! Speaks the Gemini-style `models/{model}:generateContent` REST call. The
//! upstream returns the complete text in one response, so incremental
//! delivery is emulated locally: the full reply is split into fixed-size
//! chunks and paced out with a fixed delay per chunk.

use crate::config::ProviderConfig;
use crate::error::{Result, ScenegenError};
use crate::prompts::{self, GenerationMode};
use crate::providers::{rechunk, rechunk_profile, FragmentStream, StreamFragment, TextGenerator};
use crate::session::ChatMessage;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Re-chunking generator for single-shot generate backends
#[derive(Debug)]
pub struct GenerateGenerator {
    config: ProviderConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateGenerator {
    /// Create a generator from provider configuration and a prebuilt client
    pub fn new(config: ProviderConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Concatenate history, system prompt, and topic into one prompt
    ///
    /// The backend has no message roles, so history is rendered as
    /// `role: content` lines ahead of the instruction text.
    fn build_full_prompt(mode: GenerationMode, topic: &str, history: &[ChatMessage]) -> String {
        let base = format!("{}\n\n{}", prompts::build_system_prompt(mode, topic), topic);
        if history.is_empty() {
            return base;
        }
        let history_text = history
            .iter()
            .map(|msg| format!("{}: {}", msg.role, msg.content))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{}\n\n{}", history_text, base)
    }

    /// Issue the generateContent call and extract the reply text
    async fn call(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        // Non-streaming call, so the whole request gets the total deadline.
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .timeout(std::time::Duration::from_secs(
                self.config.request_timeout_seconds,
            ))
            .json(&body)
            .send()
            .await
            .map_err(|e| ScenegenError::Provider(format!("Generate request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ScenegenError::Provider(format!(
                "Generate request rejected with status {}: {}",
                status, detail
            ))
            .into());
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ScenegenError::Provider(format!("Invalid generate response: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ScenegenError::EmptyResult.into());
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GenerateGenerator {
    async fn stream(
        &self,
        mode: GenerationMode,
        topic: &str,
        history: &[ChatMessage],
    ) -> Result<FragmentStream> {
        let prompt = Self::build_full_prompt(mode, topic, history);
        let text = self.call(&prompt).await?;

        let (chunk_size, delay) = rechunk_profile(mode);
        let chunks = rechunk(&text, chunk_size);

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            for chunk in chunks {
                if tx.send(StreamFragment::Token(chunk)).is_err() {
                    return;
                }
                tokio::time::sleep(delay).await;
            }
            let _ = tx.send(StreamFragment::Done);
        });
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.call(prompt).await
    }

    fn name(&self) -> &'static str {
        "generate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator_for(server: &MockServer) -> GenerateGenerator {
        let config = ProviderConfig {
            api_key: "AIzaSyTest".to_string(),
            base_url: server.uri(),
            model: "gemini-2.5-pro".to_string(),
            ..Default::default()
        };
        GenerateGenerator::new(config, reqwest::Client::new())
    }

    fn reply_with(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
    }

    #[test]
    fn test_full_prompt_without_history() {
        let prompt =
            GenerateGenerator::build_full_prompt(GenerationMode::Text, "gravity", &[]);
        assert!(prompt.ends_with("\n\ngravity"));
        assert!(!prompt.starts_with("user:"));
    }

    #[test]
    fn test_full_prompt_renders_history_lines_first() {
        let history = vec![
            ChatMessage::user("what is gravity"),
            ChatMessage::assistant("a force"),
        ];
        let prompt =
            GenerateGenerator::build_full_prompt(GenerationMode::Text, "tell me more", &history);
        assert!(prompt.starts_with("user: what is gravity\nassistant: a force\n\n"));
        assert!(prompt.ends_with("\n\ntell me more"));
    }

    #[tokio::test]
    async fn test_stream_rechunks_reply_then_done() {
        let server = MockServer::start().await;
        let text = "a".repeat(120);
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .and(header("x-goog-api-key", "AIzaSyTest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_with(&text)))
            .mount(&server)
            .await;

        let generator = generator_for(&server);
        let stream = generator
            .stream(GenerationMode::Animation, "topic", &[])
            .await
            .unwrap();
        let fragments: Vec<StreamFragment> = stream.collect().await;

        // 120 chars at 50 per chunk: 50 + 50 + 20, then Done.
        assert_eq!(fragments.len(), 4);
        assert_eq!(fragments[0], StreamFragment::Token("a".repeat(50)));
        assert_eq!(fragments[2], StreamFragment::Token("a".repeat(20)));
        assert_eq!(fragments[3], StreamFragment::Done);
    }

    #[tokio::test]
    async fn test_stream_text_mode_uses_larger_chunks() {
        let server = MockServer::start().await;
        let text = "b".repeat(250);
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_with(&text)))
            .mount(&server)
            .await;

        let generator = generator_for(&server);
        let stream = generator
            .stream(GenerationMode::Text, "topic", &[])
            .await
            .unwrap();
        let fragments: Vec<StreamFragment> = stream.collect().await;

        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0], StreamFragment::Token("b".repeat(200)));
        assert_eq!(fragments[1], StreamFragment::Token("b".repeat(50)));
        assert_eq!(fragments[2], StreamFragment::Done);
    }

    #[tokio::test]
    async fn test_stream_sends_concatenated_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{ "parts": [{}] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_with("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let generator = generator_for(&server);
        let stream = generator
            .stream(GenerationMode::Text, "topic", &[])
            .await
            .unwrap();
        let _: Vec<StreamFragment> = stream.collect().await;
    }

    #[tokio::test]
    async fn test_call_failure_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let generator = generator_for(&server);
        let err = generator
            .stream(GenerationMode::Animation, "topic", &[])
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<ScenegenError>(),
            Some(ScenegenError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn test_call_slower_than_deadline_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply_with("late"))
                    .set_delay(std::time::Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = ProviderConfig {
            api_key: "AIzaSyTest".to_string(),
            base_url: server.uri(),
            model: "gemini-2.5-pro".to_string(),
            request_timeout_seconds: 1,
        };
        let generator = GenerateGenerator::new(config, reqwest::Client::new());
        let err = generator.generate("slow").await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ScenegenError>(),
            Some(ScenegenError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let generator = generator_for(&server);
        let err = generator.generate("anything").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScenegenError>(),
            Some(ScenegenError::EmptyResult)
        ));
    }

    #[tokio::test]
    async fn test_generate_joins_multiple_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [
                    { "text": "first " }, { "text": "second" }
                ] } }]
            })))
            .mount(&server)
            .await;

        let generator = generator_for(&server);
        let text = generator.generate("anything").await.unwrap();
        assert_eq!(text, "first second");
    }
}
