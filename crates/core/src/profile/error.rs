//! Error types for the profile catalog.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or querying profiles and argument sets.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Source file missing, unreadable or malformed.
    #[error("Failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// No profile with the requested name.
    #[error("Profile '{name}' not found")]
    NotFound { name: String },

    /// A `key=value` segment could not be parsed.
    #[error("Invalid argument segment '{segment}': expected exactly one '='")]
    Format { segment: String },
}

impl CatalogError {
    /// Creates a new load error.
    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
