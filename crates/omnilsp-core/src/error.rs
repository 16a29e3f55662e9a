//! Error types for omnilsp-core.
//!
//! This module defines the canonical error type for the library,
//! following the Microsoft Rust Guidelines for error handling.

use std::path::PathBuf;

/// JSON-RPC error code for parse errors.
pub const CODE_PARSE_ERROR: i32 = -32700;
/// JSON-RPC error code for a malformed request envelope.
pub const CODE_INVALID_REQUEST: i32 = -32600;
/// JSON-RPC error code for unknown methods.
pub const CODE_METHOD_NOT_FOUND: i32 = -32601;
/// JSON-RPC error code for malformed request parameters.
pub const CODE_INVALID_PARAMS: i32 = -32602;
/// JSON-RPC error code for internal server failures.
pub const CODE_INTERNAL_ERROR: i32 = -32603;
/// LSP error code for a request cancelled by the client.
pub const CODE_REQUEST_CANCELLED: i32 = -32800;

/// The main error type for omnilsp-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed request parameters from the editor.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Malformed backend response body.
    #[error("decode error: {0}")]
    Decode(String),

    /// Network or HTTP failure reaching the backend.
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend call exceeded the configured deadline.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Request method is not handled by this server.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Request was cancelled by the client before completion.
    #[error("request cancelled")]
    Cancelled,

    /// Document URI could not be converted to a file path.
    #[error("invalid URI: {0}")]
    InvalidUri(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// The editor stream closed mid-message.
    #[error("protocol stream closed")]
    StreamClosed,

    /// LSP framing violation on the editor stream.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Map this error to the JSON-RPC error code reported to the editor.
    ///
    /// Parameter decoding failures are invalid-params; everything that goes
    /// wrong past the parameter boundary (backend transport, backend body
    /// decoding, timeouts) is an internal error from the editor's point of
    /// view.
    #[must_use]
    pub const fn rpc_code(&self) -> i32 {
        match self {
            Self::UnsupportedMethod(_) => CODE_METHOD_NOT_FOUND,
            Self::InvalidParams(_) | Self::InvalidUri(_) => CODE_INVALID_PARAMS,
            Self::Cancelled => CODE_REQUEST_CANCELLED,
            _ => CODE_INTERNAL_ERROR,
        }
    }
}

/// A specialized Result type for omnilsp-core operations.
pub type Result<T> = std::result::Result<T, Error>;
