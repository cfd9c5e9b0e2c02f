//! WASM bindings for mermaid-compose.
//!
//! Exposes `parse`, `format` and `validate` to JavaScript via wasm-bindgen.
//! Structured results cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

/// Parse flowchart text into `{ doc, warnings }` JSON.
#[wasm_bindgen]
pub fn parse(src: &str) -> Result<String, JsError> {
    serde_json::to_string(&crate::parse(src)).map_err(|e| JsError::new(&e.to_string()))
}

/// Canonical reformat of flowchart text.
///
/// - `direction`: "LR", "RL", "TD", "BT", or empty string to keep the text's own direction
#[wasm_bindgen]
pub fn format(src: &str, direction: &str) -> Result<String, JsError> {
    let dir = if direction.is_empty() {
        None
    } else {
        Some(direction)
    };
    crate::format(src, dir).map_err(|e| JsError::new(&e.to_string()))
}

/// Parse warnings and validation issues as a JSON array of diagnostics.
#[wasm_bindgen]
pub fn validate(src: &str) -> Result<String, JsError> {
    serde_json::to_string(&crate::diagnostics(src)).map_err(|e| JsError::new(&e.to_string()))
}
