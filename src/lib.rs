//! Scenegen - streaming generation backend library
//!
//! This library provides the core functionality for the Scenegen service:
//! streamed LLM generation over server-sent events, an in-memory session
//! store for projects and chats, interactive artifact generation, and a
//! text-to-speech pass-through.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `providers`: Generation backend abstraction and the two variants
//!   (chat-completions streaming, single-shot generate)
//! - `stream`: Orchestration between a provider stream and an SSE client
//! - `session`: Volatile project/chat store and its entity types
//! - `prompts`: Prompt templates for the generation modes
//! - `artifact`: One-shot interactive document generation
//! - `server`: Axum routes and HTTP error mapping
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use scenegen::Config;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load("config.yaml", &Default::default())?;
//! config.validate()?;
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod server;
pub mod session;
pub mod stream;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, ScenegenError};
pub use prompts::GenerationMode;
pub use session::SessionStore;
pub use stream::StreamState;
