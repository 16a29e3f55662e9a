//! Wire types for the OmniSharp autocomplete endpoint and the mapping
//! from backend candidates to LSP completion items.

use lsp_types::{CompletionItem, CompletionItemKind};
use serde::{Deserialize, Serialize};

/// A completion query extracted from an editor request.
///
/// Built per request, handed to the backend, and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionQuery {
    /// Path of the file being edited.
    pub file_name: String,
    /// Zero-based line of the cursor.
    pub line: u32,
    /// Zero-based column of the cursor.
    pub column: u32,
}

/// Request body for `POST /autocomplete`.
///
/// OmniSharp expects PascalCase field names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutocompleteRequest {
    /// Cursor line.
    pub line: u32,
    /// Cursor column.
    pub column: u32,
    /// File the completion applies to.
    pub file_name: String,
}

impl From<&CompletionQuery> for AutocompleteRequest {
    fn from(query: &CompletionQuery) -> Self {
        Self {
            line: query.line,
            column: query.column,
            file_name: query.file_name.clone(),
        }
    }
}

/// One completion candidate as produced by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutocompleteCandidate {
    /// Text to insert when the candidate is accepted.
    #[serde(default)]
    pub completion_text: String,
    /// Text shown in the completion menu.
    #[serde(default)]
    pub display_text: String,
    /// Short documentation string.
    #[serde(default)]
    pub documentation: String,
    /// Backend kind tag, e.g. "Method" or "Class".
    #[serde(default)]
    pub kind: String,
}

impl AutocompleteCandidate {
    /// Convert this candidate into a protocol-native completion item.
    ///
    /// The mapping is one-to-one and pure; candidate order is preserved by
    /// the caller mapping over the backend array.
    #[must_use]
    pub fn into_completion_item(self) -> CompletionItem {
        CompletionItem {
            label: self.display_text,
            detail: if self.documentation.is_empty() {
                None
            } else {
                Some(self.documentation)
            },
            kind: Some(map_kind(&self.kind)),
            insert_text: Some(self.completion_text),
            ..CompletionItem::default()
        }
    }
}

/// Map an OmniSharp kind tag to an LSP completion item kind.
///
/// Total over all inputs: unrecognized tags fall back to the generic text
/// kind, never an error.
#[must_use]
pub fn map_kind(kind: &str) -> CompletionItemKind {
    match kind {
        "Method" => CompletionItemKind::METHOD,
        "Property" => CompletionItemKind::PROPERTY,
        "Field" => CompletionItemKind::FIELD,
        "Class" => CompletionItemKind::CLASS,
        _ => CompletionItemKind::TEXT,
    }
}
