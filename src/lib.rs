//! mermaid-compose — keeps Mermaid flowchart text and a structured diagram
//! document in sync.
//!
//! Public API: [`parse`], [`serialize`], [`normalize`], [`validate`],
//! [`format`], and the [`composer::Composer`] consistency engine.

pub mod composer;
pub mod config;
pub mod error;
pub mod layout;
pub mod normalizer;
pub mod parsers;
pub mod serializer;
pub mod syntax;
pub mod validator;

#[cfg(feature = "wasm")]
mod wasm;

pub use crate::error::{ComposeError, Result};
pub use crate::normalizer::normalize;
pub use crate::parsers::{ParseResult, parse};
pub use crate::serializer::serialize;
pub use crate::syntax::diagnostics::{Diagnostic, ParseWarning, Severity, ValidationIssue};
pub use crate::syntax::types::{DiagramDocument, Direction};
pub use crate::validator::validate;

/// Canonical text for `src`: parse, optionally override the direction,
/// normalize, serialize.
pub fn format(src: &str, direction: Option<&str>) -> Result<String> {
    let mut doc = parse(src).doc;
    if let Some(dir) = direction {
        doc.direction = dir.parse::<Direction>()?;
    }
    Ok(serialize(&normalize(&doc)))
}

/// Parse warnings followed by validation issues for `src`.
pub fn diagnostics(src: &str) -> Vec<Diagnostic> {
    let ParseResult { doc, warnings } = parse(src);
    let mut out: Vec<Diagnostic> = warnings.into_iter().map(Diagnostic::from).collect();
    out.extend(validate(&doc).into_iter().map(Diagnostic::from));
    out
}
