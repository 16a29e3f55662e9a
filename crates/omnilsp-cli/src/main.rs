//! omnilsp - LSP front end for the OmniSharp HTTP API
//!
//! This binary speaks the Language Server Protocol over stdio and relays
//! completion requests to an OmniSharp backend over HTTP.

use anyhow::{Context, Result};
use clap::Parser;

mod args;
mod logging;

use args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    logging::init(&args.log_level, args.log_json)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting omnilsp");

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        omnilsp_core::Config::load_from(config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))?
    } else {
        omnilsp_core::Config::load().context("failed to load configuration")?
    };

    // The flag/environment override wins over the configuration file
    if let Some(backend_url) = args.backend_url {
        config.backend.base_url = backend_url;
    }

    tracing::debug!(
        backend = %config.backend.base_url,
        "configuration loaded"
    );

    // Run the gateway until the editor closes the stream
    omnilsp_core::serve(config).await.context("server error")?;

    tracing::info!("omnilsp shutdown complete");
    Ok(())
}
