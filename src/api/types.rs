//! Remote store types: errors, project payloads, and the pure JSON parsers.
//!
//! Parsers never fail on a well-formed JSON document with the wrong shape:
//! missing lists parse as empty and malformed entries are skipped, so a
//! partial payload degrades to less data instead of an error.

use canvas::doc::Annotation;
use canvas::nav::ImageRef;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by remote store operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The remote store returned a non-success HTTP status.
    #[error("remote returned status {status}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The raster could not be decoded.
    #[error("image decode failed: {0}")]
    Image(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// A project as returned by `GET /projects/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub images: Vec<ImageRef>,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_value(json: &str) -> Result<Value, ApiError> {
    serde_json::from_str(json).map_err(|e| ApiError::Parse(e.to_string()))
}

fn parse_items<T: DeserializeOwned>(value: Option<&Value>, what: &'static str) -> Vec<T> {
    let Some(items) = value.and_then(Value::as_array) else {
        debug!(what, "expected a list; treating as empty");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(what, error = %e, "skipping malformed entry");
                None
            }
        })
        .collect()
}

fn string_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Parse a project document. A missing or malformed `images` field is empty.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] only if the body is not JSON at all.
pub fn parse_project(json: &str) -> Result<Project, ApiError> {
    let value = parse_value(json)?;
    Ok(Project {
        id: string_field(&value, "id"),
        name: string_field(&value, "name"),
        images: parse_items(value.get("images"), "images"),
    })
}

/// Parse an annotation list. A non-array body is an empty list.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] only if the body is not JSON at all.
pub fn parse_annotations(json: &str) -> Result<Vec<Annotation>, ApiError> {
    let value = parse_value(json)?;
    Ok(parse_items(Some(&value), "annotations"))
}

/// Parse a `{ "classes": [...] }` document. Non-string entries are dropped.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] only if the body is not JSON at all.
pub fn parse_classes(json: &str) -> Result<Vec<String>, ApiError> {
    let value = parse_value(json)?;
    Ok(parse_items(value.get("classes"), "classes"))
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
