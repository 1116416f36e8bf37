//! Command-line interface definition for Scenegen
//!
//! This module defines the CLI structure using clap's derive API. The binary
//! has a single job (serve the HTTP API), so there are no subcommands; the
//! flags override the configuration file.

use clap::Parser;

/// Scenegen - streaming generation backend
///
/// Serve the generation and session API, streaming LLM output to clients
/// over server-sent events.
#[derive(Parser, Debug, Clone)]
#[command(name = "scenegen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Bind address override (e.g. 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Port override
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            host: None,
            port: None,
            verbose: false,
        }
    }
}
