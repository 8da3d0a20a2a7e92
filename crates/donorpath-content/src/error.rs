//! Load-time errors for the Content Store.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::validation::GraphDefect;

/// Failures while loading content. Every one of these aborts the load; a
/// store that exists is structurally valid.
#[derive(Debug, Error)]
pub enum ContentError {
    /// A content file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A document does not match the content schema.
    #[error("{document} document does not match schema: {source}")]
    Schema {
        /// Which document failed (`stories` or `hotspots`).
        document: &'static str,
        /// The deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A structural invariant is violated.
    #[error("invalid content: {0}")]
    Invalid(String),

    /// Choices reference scenes that do not exist (strict loads only).
    #[error("content graph has {} dangling choice reference(s)", .0.len())]
    BrokenGraph(Vec<GraphDefect>),
}
