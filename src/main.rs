//! Scenegen - streaming generation backend
//!
#![doc = "Scenegen - streaming generation backend"]
#![doc = "Main entry point for the Scenegen service."]

use anyhow::Result;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scenegen::cli::Cli;
use scenegen::config::Config;
use scenegen::server::{self, AppState};
use scenegen::session::SessionStore;
use scenegen::providers;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Select the generation backend once; requests are never re-routed.
    let generator = providers::from_config(&config.provider)?;

    // Session state is volatile and starts empty on every launch.
    let store = Arc::new(SessionStore::new());

    let state = AppState::new(store, generator, config);
    server::run(state).await
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "scenegen=debug"
    } else {
        "scenegen=info"
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
