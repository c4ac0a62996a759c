//! Error taxonomy for the generation engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MapperError>;

/// Errors raised while loading, validating or emitting from a document.
#[derive(Error, Debug)]
pub enum MapperError {
    // =========================================================================
    // Document errors (abort the whole run before any emission)
    // =========================================================================
    #[error("Schema file not found: {}", path.display())]
    SchemaFileMissing { path: PathBuf },

    #[error("Malformed document {}: {message}", path.display())]
    MalformedSchemaShape { path: PathBuf, message: String },

    #[error(
        "Error in model \"{model}\": referenced model \"{target}\" in relationship \"{field}\" does not exist in schema"
    )]
    UnresolvedRelationship {
        model: String,
        field: String,
        target: String,
    },

    // =========================================================================
    // Emission errors (local to one artifact)
    // =========================================================================
    #[error("Failed to write {}: {source}", path.display())]
    FileSystemWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Formatter fix failed on {}: {message}", dir.display())]
    FormatterFixFailure { dir: PathBuf, message: String },

    // =========================================================================
    // Ambient errors
    // =========================================================================
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("File watcher error: {0}")]
    Watch(String),
}

impl MapperError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MapperError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MapperError::FileSystemWriteFailure {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MapperError::MalformedSchemaShape {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the run was aborted because the document itself is not there yet.
    ///
    /// Watchers treat this as "nothing to do".
    pub fn is_missing_document(&self) -> bool {
        matches!(self, MapperError::SchemaFileMissing { .. })
    }
}
