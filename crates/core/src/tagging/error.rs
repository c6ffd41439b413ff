//! Error types for the tagging module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while mapping or writing metadata tags.
#[derive(Debug, Error)]
pub enum TagError {
    /// Bad caller input: empty key, unsupported value shape, bad options.
    #[error("{reason}")]
    Value { reason: String },

    /// Unsupported or unreadable audio container.
    #[error("{reason}")]
    AudioFormat { reason: String },

    /// Mapping load or tag write failure.
    #[error("{reason}")]
    Metadata { reason: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TagError {
    pub fn value(reason: impl Into<String>) -> Self {
        Self::Value {
            reason: reason.into(),
        }
    }

    pub fn audio_format(reason: impl Into<String>) -> Self {
        Self::AudioFormat {
            reason: reason.into(),
        }
    }

    pub fn metadata(reason: impl Into<String>) -> Self {
        Self::Metadata {
            reason: reason.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}
