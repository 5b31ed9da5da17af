//! Error types for the dispute SML engine

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while training, persisting, or loading a model
#[derive(Error, Debug)]
pub enum SmlError {
    /// Fewer usable training rows than the configured minimum
    #[error("Insufficient training data: {available} usable samples, need at least {required}")]
    InsufficientData { available: usize, required: usize },

    /// No model is held in memory and none is persisted
    #[error("Model not trained yet")]
    ModelNotTrained,

    /// Invalid model or training parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// I/O failure while reading or writing the persisted artifact
    #[error("Persistence failure at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Binary encoding or decoding of the artifact failed
    #[error("Artifact codec error: {0}")]
    Codec(String),

    /// The persisted artifact failed an integrity or shape check
    #[error("Corrupt artifact: {0}")]
    CorruptArtifact(String),

    /// Configuration file could not be parsed or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SmlError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Whether the error is one of the recoverable training preconditions
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

impl From<bincode::Error> for SmlError {
    fn from(err: bincode::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

/// Result type for dispute SML operations
pub type Result<T> = std::result::Result<T, SmlError>;
