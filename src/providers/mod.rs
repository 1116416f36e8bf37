//! Provider abstraction over the upstream generation backends
//!
//! Two heterogeneous backends are supported behind one trait: a
//! chat-completions service that streams deltas over SSE, and a single-shot
//! generate service whose full reply is re-chunked locally to emulate
//! incremental delivery. The variant is chosen once at startup from the
//! shape of the API key and never re-routed per request.

pub mod chat;
pub mod generate;

pub use chat::ChatStreamGenerator;
pub use generate::GenerateGenerator;

use crate::config::ProviderConfig;
use crate::error::{Result, ScenegenError};
use crate::prompts::GenerationMode;
use crate::session::ChatMessage;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// One unit of streamed output
///
/// Every stream carries zero or more `Token` fragments followed by exactly
/// one terminal fragment, `Done` or `Error`, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFragment {
    /// Incremental text produced by the model
    Token(String),
    /// Successful end of stream
    Done,
    /// Terminal failure; no fragments follow
    Error {
        /// Coarse failure category (e.g. "provider")
        kind: String,
        /// Human-readable description
        message: String,
    },
}

impl StreamFragment {
    /// Convenience constructor for a provider-side error fragment
    pub fn provider_error(message: impl Into<String>) -> Self {
        Self::Error {
            kind: "provider".to_string(),
            message: message.into(),
        }
    }

    /// Serialize the fragment to its wire JSON payload
    pub fn to_payload(&self) -> String {
        match self {
            Self::Token(token) => serde_json::json!({ "token": token }).to_string(),
            Self::Done => serde_json::json!({ "event": "[DONE]" }).to_string(),
            Self::Error { kind, message } => serde_json::json!({
                "error": message,
                "type": kind,
                "message": message,
            })
            .to_string(),
        }
    }

    /// Whether this fragment ends the stream
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Token(_))
    }
}

/// Boxed fragment stream returned by a generator
pub type FragmentStream = Pin<Box<dyn Stream<Item = StreamFragment> + Send>>;

/// Capability seam over the upstream generation backends
///
/// Implementations own their HTTP client and configuration; they are built
/// once at startup and shared immutably across requests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Start a streamed generation for a topic with optional history
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::Provider` if the upstream call is rejected
    /// before any output is produced. Mid-stream faults are signalled by the
    /// returned stream ending without a terminal fragment.
    async fn stream(
        &self,
        mode: GenerationMode,
        topic: &str,
        history: &[ChatMessage],
    ) -> Result<FragmentStream>;

    /// One-shot generation returning the full text
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::Provider` on call failure and
    /// `ScenegenError::EmptyResult` when the reply carries no text.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Short identifier for logging
    fn name(&self) -> &'static str;
}

/// Connection establishment deadline for provider calls
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Select and construct the generator for a configuration
///
/// Keys with the `sk-` prefix select the chat-completions streaming variant;
/// anything else selects the single-shot generate variant.
///
/// The shared client bounds connect time and per-read inactivity only; a
/// legitimate stream may outlive any total deadline, so the full
/// `request_timeout_seconds` budget is applied per request on the
/// non-streaming calls instead.
///
/// # Errors
///
/// Returns `ScenegenError::Config` if the base URL is empty or the HTTP
/// client cannot be built.
pub fn from_config(config: &ProviderConfig) -> Result<Arc<dyn TextGenerator>> {
    if config.base_url.trim().is_empty() {
        return Err(ScenegenError::Config("provider.base_url is required".to_string()).into());
    }

    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(Duration::from_secs(config.request_timeout_seconds))
        .build()
        .map_err(|e| ScenegenError::Config(format!("Failed to build HTTP client: {}", e)))?;

    let generator: Arc<dyn TextGenerator> = if config.api_key.starts_with("sk-") {
        Arc::new(ChatStreamGenerator::new(config.clone(), client))
    } else {
        Arc::new(GenerateGenerator::new(config.clone(), client))
    };
    tracing::info!("Using {} backend with model {}", generator.name(), config.model);
    Ok(generator)
}

/// Split text into fixed-size chunks by character count
///
/// Boundaries fall on char boundaries, so multi-byte text never splits
/// mid-codepoint. The final chunk may be shorter.
pub fn rechunk(text: &str, size: usize) -> Vec<String> {
    if size == 0 || text.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Inter-fragment pacing delay for the chat-streaming variant
pub(crate) fn chat_pacing(mode: GenerationMode) -> Option<Duration> {
    match mode {
        GenerationMode::Animation => Some(Duration::from_millis(1)),
        GenerationMode::Text => None,
    }
}

/// Chunk size and pacing delay for the single-shot variant
pub(crate) fn rechunk_profile(mode: GenerationMode) -> (usize, Duration) {
    match mode {
        GenerationMode::Animation => (50, Duration::from_millis(50)),
        GenerationMode::Text => (200, Duration::from_millis(10)),
    }
}
