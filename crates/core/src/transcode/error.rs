//! Error types for the transcode module.

use std::path::PathBuf;
use thiserror::Error;

use crate::profile::CatalogError;

/// Errors that can occur while building, running or probing engine commands.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Bad caller input, raised before any side effect.
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    /// The command is not fully configured.
    #[error("Command not configured: {reason}")]
    Config { reason: String },

    /// The engine exited with a nonzero status.
    #[error(
        "Engine execution failed: {reason}\nstderr: {}\nstdout: {}",
        .stderr.as_deref().unwrap_or(""),
        .stdout.as_deref().unwrap_or("")
    )]
    Execution {
        reason: String,
        stderr: Option<String>,
        stdout: Option<String>,
    },

    /// The probe tool failed or produced unreadable output.
    #[error("Probe failed: {reason}")]
    Probe { reason: String },

    /// Executable could not be spawned because it does not exist.
    #[error("Executable not found: {path}")]
    EngineNotFound { path: PathBuf },

    /// The process exceeded the configured timeout and was killed.
    #[error("Process timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// A filesystem operation outside of loading failed.
    #[error("Filesystem error at {path}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No free output path within the attempt bound.
    #[error("No free output path for {base} after {attempts} attempts")]
    UniquePathExhausted { base: PathBuf, attempts: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Profile or argument resolution failed.
    #[error(transparent)]
    Arguments(#[from] CatalogError),
}

impl TranscodeError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Creates an execution error carrying both captured engine streams.
    pub fn execution(
        reason: impl Into<String>,
        stderr: Option<String>,
        stdout: Option<String>,
    ) -> Self {
        Self::Execution {
            reason: reason.into(),
            stderr,
            stdout,
        }
    }

    pub fn probe(reason: impl Into<String>) -> Self {
        Self::Probe {
            reason: reason.into(),
        }
    }

    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// The captured engine stderr, if this is an execution failure.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Execution { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }

    /// The captured engine stdout, if this is an execution failure.
    pub fn stdout(&self) -> Option<&str> {
        match self {
            Self::Execution { stdout, .. } => stdout.as_deref(),
            _ => None,
        }
    }
}
