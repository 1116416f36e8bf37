//! Shared helpers for router-level tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use scenegen::config::{Config, ProviderConfig, ServerConfig, TtsConfig};
use scenegen::error::{Result, ScenegenError};
use scenegen::providers::{FragmentStream, StreamFragment, TextGenerator};
use scenegen::server::{router, AppState};
use scenegen::session::{ChatMessage, SessionStore};
use scenegen::GenerationMode;
use std::sync::Arc;

/// Generator double that replays a fixed script for streams and a fixed
/// reply for one-shot generation
pub struct ScriptedGenerator {
    pub script: Vec<StreamFragment>,
    pub reply: std::result::Result<String, String>,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self {
            script: vec![StreamFragment::Done],
            reply: Ok("ok".to_string()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn stream(
        &self,
        _mode: GenerationMode,
        _topic: &str,
        _history: &[ChatMessage],
    ) -> Result<FragmentStream> {
        Ok(Box::pin(futures::stream::iter(self.script.clone())))
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(msg) => Err(ScenegenError::Provider(msg.clone()).into()),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn test_config() -> Config {
    Config {
        server: ServerConfig::default(),
        provider: ProviderConfig {
            api_key: "sk-test".to_string(),
            base_url: "http://provider.invalid".to_string(),
            ..Default::default()
        },
        tts: TtsConfig::default(),
    }
}

/// Build a router around a scripted generator and a fresh store
pub fn test_app(generator: ScriptedGenerator) -> Router {
    let state = AppState::new(
        Arc::new(SessionStore::new()),
        Arc::new(generator),
        test_config(),
    );
    router(state)
}

/// Build a router with the default (immediately completing) generator
pub fn default_app() -> Router {
    test_app(ScriptedGenerator::default())
}

/// Build a JSON request
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read a response body as JSON
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as a UTF-8 string
pub async fn response_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
