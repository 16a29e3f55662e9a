//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// LSP front end for the OmniSharp HTTP API.
///
/// Speaks the Language Server Protocol over stdio and relays completion
/// requests to an OmniSharp backend.
#[derive(Debug, Parser)]
#[command(name = "omnilsp")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, searches for omnilsp.toml in:
    /// 1. $OMNILSP_CONFIG environment variable
    /// 2. Current directory
    /// 3. ~/.config/omnilsp/omnilsp.toml
    #[arg(short, long, value_name = "FILE", env = "OMNILSP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the OmniSharp backend, e.g. http://localhost:2000
    ///
    /// Overrides the value from the configuration file.
    #[arg(short, long, value_name = "URL", env = "OMNILSP_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Logging level
    ///
    /// Valid values: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info", env = "OMNILSP_LOG")]
    pub log_level: String,

    /// Output logs as JSON (for structured logging)
    #[arg(long, default_value = "false", env = "OMNILSP_LOG_JSON")]
    pub log_json: bool,
}
