//! Request handlers for the supported LSP methods.

use lsp_types::{
    CompletionList, CompletionOptions, CompletionParams, InitializeResult, ServerCapabilities,
    ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions, Uri,
};
use serde_json::Value;

use crate::backend::{CompletionBackend, CompletionQuery};
use crate::error::{Error, Result};

/// Build the static capability descriptor advertised at initialize time.
///
/// Deterministic and parameter-independent: completion with `.` and space
/// as trigger characters, whole-document sync, open/close notifications
/// accepted.
#[must_use]
pub fn initialize_result() -> InitializeResult {
    InitializeResult {
        capabilities: ServerCapabilities {
            completion_provider: Some(CompletionOptions {
                trigger_characters: Some(vec![".".to_string(), " ".to_string()]),
                ..CompletionOptions::default()
            }),
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    ..TextDocumentSyncOptions::default()
                },
            )),
            ..ServerCapabilities::default()
        },
        server_info: Some(ServerInfo {
            name: "omnilsp".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    }
}

/// Handle a `textDocument/completion` request.
///
/// Extracts {uri→filename, line, character}, delegates to the backend, and
/// maps the candidates one-to-one into a completion list with
/// `is_incomplete = false`. Candidate order is preserved.
///
/// # Errors
///
/// Returns `Error::InvalidParams` for missing or malformed params,
/// `Error::InvalidUri` for non-file URIs, and propagates backend errors.
pub async fn handle_completion<B: CompletionBackend>(
    backend: &B,
    params: Option<Value>,
) -> Result<Value> {
    let params = params.ok_or_else(|| Error::InvalidParams("completion params missing".to_string()))?;
    let params: CompletionParams = serde_json::from_value(params)
        .map_err(|e| Error::InvalidParams(format!("malformed completion params: {e}")))?;

    let position = params.text_document_position;
    let query = CompletionQuery {
        file_name: uri_to_file_path(&position.text_document.uri)?,
        line: position.position.line,
        column: position.position.character,
    };

    let candidates = backend.completion(&query).await?;
    let list = CompletionList {
        is_incomplete: false,
        items: candidates
            .into_iter()
            .map(crate::backend::AutocompleteCandidate::into_completion_item)
            .collect(),
    };

    Ok(serde_json::to_value(list)?)
}

/// Convert a `file://` document URI to the backend's filename form.
///
/// The backend addresses documents by plain filesystem path, so only file
/// URIs are accepted. Percent-encoded bytes in the path are decoded.
///
/// # Errors
///
/// Returns `Error::InvalidUri` for non-file schemes or malformed
/// percent-encoding.
pub fn uri_to_file_path(uri: &Uri) -> Result<String> {
    let text = uri.as_str();
    let rest = text
        .strip_prefix("file://")
        .ok_or_else(|| Error::InvalidUri(text.to_string()))?;

    // file:///a/b carries an empty authority; file://host/a/b names a
    // remote host which the backend cannot reach.
    let path = match rest.split_once('/') {
        Some(("", _)) => rest,
        _ => return Err(Error::InvalidUri(text.to_string())),
    };

    percent_decode(path).ok_or_else(|| Error::InvalidUri(text.to_string()))
}

/// Decode %XX sequences; returns `None` on malformed encoding.
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}
