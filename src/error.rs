//! Hard failures.
//!
//! Parsing, serializing, normalizing, validating and composing never fail;
//! their problems are reported as [`Diagnostic`](crate::syntax::diagnostics::Diagnostic)s.
//! `ComposeError` only covers the edges of the crate: reading input,
//! writing output and (de)serializing persisted snapshots.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown direction '{0}'; use LR, RL, TD, or BT")]
    InvalidDirection(String),
}

pub type Result<T> = std::result::Result<T, ComposeError>;
