//! JSON-RPC 2.0 plumbing for the editor-facing stream.
//!
//! This module implements the LSP base protocol: message types and the
//! Content-Length framed transport over stdio.

mod transport;
mod types;

pub use transport::{FrameReader, FrameWriter, stdio_transport};
pub use types::{InboundMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId, RpcError};
