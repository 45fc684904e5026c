//! Error types for Strata
//!
//! All modules use `StrataResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Strata operations
pub type StrataResult<T> = Result<T, StrataError>;

/// All errors that can occur in Strata
#[derive(Error, Debug)]
pub enum StrataError {
    // Retrieval errors
    #[error("Failed to retrieve {uri}: {reason}")]
    Retrieval { uri: String, reason: String },

    #[error("SHA-256 mismatch for {path}: expected {expected}, found {actual}")]
    DigestMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // Contribution errors
    #[error("Contribution failed: {0}")]
    Contribution(String),

    // Layer errors
    #[error("Malformed layer metadata at {path}: {reason}")]
    MetadataCodec { path: PathBuf, reason: String },

    #[error("Invalid layer key '{key}': {reason}")]
    InvalidLayerKey { key: String, reason: String },

    #[error("Invalid process type '{0}': expected TYPE=COMMAND")]
    InvalidProcess(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("Write failed: {context}")]
    Write {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl StrataError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a write error with context
    pub fn write(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Write {
            context: context.into(),
            source,
        }
    }

    /// Create a retrieval error
    pub fn retrieval(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Retrieval {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Create a contribution error, for use by contributor implementations
    pub fn contribution(message: impl Into<String>) -> Self {
        Self::Contribution(message.into())
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MetadataCodec { .. } => Some(
                "Delete the layer metadata file or set layers.tolerate_corrupt_metadata = true",
            ),
            Self::DigestMismatch { .. } => {
                Some("Check that --sha256 matches the artifact at --uri")
            }
            Self::InvalidProcess(_) => Some("Example: strata launch web='java -jar app.jar'"),
            _ => None,
        }
    }
}
