//! Error types for the fallible edges of the overlay (configuration and graph snapshots).
//!
//! Pointer handling itself never fails: out-of-order events are ignored by guards.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for overlay operations.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Errors that can occur while loading configuration or building graphs.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// IO error while reading or writing a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be located or parsed.
    #[error("Failed to load config from {path}: {message}")]
    ConfigLoad { path: PathBuf, message: String },

    /// A configuration key or value was rejected.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A colour component was outside `0.0..=1.0`.
    #[error("Invalid colour component {component}: {value}")]
    InvalidColor { component: &'static str, value: f32 },

    /// An edge in a graph snapshot refers to a node that does not exist.
    #[error("Edge {edge} references unknown node {node}")]
    DanglingEdge { edge: String, node: String },

    /// Two nodes in a graph snapshot share the same key.
    #[error("Duplicate node key {0}")]
    DuplicateNode(String),
}

impl OverlayError {
    /// Create a config load error for a path.
    pub fn config_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}
