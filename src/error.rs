//! Error types for loading and writing datasets.
//!
//! Per-file problems are recovered from inside the loader; only the
//! variants that escape [`crate::loader::load_all`] or the output writers
//! reach the caller.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    /// An environment variable was set but unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The data directory itself is missing or not a directory.
    #[error("Data directory not found: {}", .0.display())]
    DataDir(PathBuf),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file parsed but its top level is not an array of records.
    #[error("Expected a JSON array in {}", .0.display())]
    NotAnArray(PathBuf),

    /// No file with this name exists under the data directory.
    #[error("Source file not found: {0}")]
    SourceMissing(String),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
