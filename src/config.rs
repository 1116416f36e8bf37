//! Configuration management for Scenegen
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from a YAML file, environment variables, and CLI overrides.

use crate::cli::Cli;
use crate::error::{Result, ScenegenError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Scenegen
///
/// Holds everything needed to run the service: the bind address, the
/// generation provider credentials, and the text-to-speech pass-through
/// target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Generation provider settings
    pub provider: ProviderConfig,

    /// Text-to-speech forwarding settings
    #[serde(default)]
    pub tts: TtsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Generation provider configuration
///
/// The backend variant is chosen once at startup from the shape of the
/// credential: keys starting with `sk-` select the chat-completions
/// streaming variant, anything else selects the single-shot generate
/// variant. Requests are never re-routed per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for the upstream LLM service
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the upstream LLM service
    #[serde(default)]
    pub base_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Provider call deadline (seconds)
    ///
    /// Total budget for non-streaming calls and the per-read inactivity
    /// bound for streamed responses. A stalled upstream call fails with a
    /// provider error instead of hanging forever, while a healthy stream
    /// may run longer than this in total.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: String::new(),
            model: default_model(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Text-to-speech forwarding configuration
///
/// The TTS endpoint is an opaque pass-through: the service forwards the
/// request and returns the audio bytes unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TtsConfig {
    /// Synthesis service endpoint; TTS requests fail when unset
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Optional bearer token for the synthesis service
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// Precedence, lowest to highest: file values, `SCENEGEN_API_KEY`
    /// environment variable, CLI flags.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::Config` if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P, cli: &Cli) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ScenegenError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config: Config = serde_yaml::from_str(&contents).map_err(|e| {
            ScenegenError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        config.apply_overrides(cli);
        Ok(config)
    }

    /// Apply environment and CLI overrides to a loaded configuration
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Ok(key) = std::env::var("SCENEGEN_API_KEY") {
            if !key.is_empty() {
                self.provider.api_key = key;
            }
        }
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ScenegenError::Config` when the API key is missing or still
    /// the placeholder, or when the request timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.provider.api_key.is_empty() {
            return Err(ScenegenError::Config(
                "provider.api_key is required (set it in the config file or SCENEGEN_API_KEY)"
                    .to_string(),
            )
            .into());
        }
        if self.provider.api_key.starts_with("sk-REPLACE_ME") {
            return Err(ScenegenError::Config(
                "provider.api_key is still the placeholder value".to_string(),
            )
            .into());
        }
        if self.provider.model.trim().is_empty() {
            return Err(ScenegenError::Config("provider.model must not be empty".to_string()).into());
        }
        if !self.provider.base_url.trim().is_empty() {
            url::Url::parse(&self.provider.base_url).map_err(|e| {
                ScenegenError::Config(format!("provider.base_url is invalid: {}", e))
            })?;
        }
        if let Some(endpoint) = &self.tts.endpoint {
            url::Url::parse(endpoint)
                .map_err(|e| ScenegenError::Config(format!("tts.endpoint is invalid: {}", e)))?;
        }
        if self.provider.request_timeout_seconds == 0 {
            return Err(ScenegenError::Config(
                "provider.request_timeout_seconds must be greater than zero".to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
