//! # omnilsp-core
//!
//! Core library for the omnilsp language server: a thin LSP front end that
//! relays completion requests from an editor to an OmniSharp HTTP backend,
//! translating between the two wire formats.
//!
//! ## Architecture
//!
//! - [`rpc`] - JSON-RPC 2.0 message types and the Content-Length framed
//!   transport over stdio
//! - [`gateway`] - the editor-facing receive loop and method dispatch
//! - [`backend`] - the stateless HTTP bridge to the OmniSharp API
//! - [`config`] - configuration types and loading
//! - [`error`] - error types for the library
//!
//! ## Example
//!
//! ```rust,ignore
//! use omnilsp_core::{Config, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), omnilsp_core::Error> {
//!     let config = Config::load()?;
//!     serve(config).await
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod gateway;
pub mod rpc;

use backend::OmniSharpClient;
pub use config::Config;
pub use error::Error;
use gateway::Gateway;
use rpc::stdio_transport;

/// Start the omnilsp server on the process stdio pair.
///
/// This is the primary entry point. The stream is owned by the gateway for
/// the process lifetime; a graceful close (the editor's `exit` notification
/// or EOF) returns `Ok(())`, a broken stream returns the error.
///
/// # Errors
///
/// Returns an error if the backend client cannot be built or the stdio
/// stream fails mid-frame.
pub async fn serve(config: Config) -> Result<(), Error> {
    config.validate()?;

    tracing::info!(
        backend = %config.backend.base_url,
        timeout_seconds = config.backend.timeout_seconds,
        "starting omnilsp gateway"
    );

    let client = OmniSharpClient::new(&config.backend)?;
    let (reader, writer) = stdio_transport();

    let result = Gateway::new(client).run(reader, writer).await;

    tracing::info!("omnilsp gateway shut down");
    result
}
