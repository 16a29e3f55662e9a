//! Backend bridge to the OmniSharp HTTP API.
//!
//! Stateless translation of one completion query into one backend HTTP
//! call, plus the mapping from backend-native candidates to LSP completion
//! items.

mod client;
mod types;

pub use client::{CompletionBackend, OmniSharpClient};
pub use types::{AutocompleteCandidate, AutocompleteRequest, CompletionQuery, map_kind};
