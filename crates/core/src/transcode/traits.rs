//! Trait definitions for the transcode module.

use async_trait::async_trait;
use std::path::Path;

use super::error::TranscodeError;

/// Which output streams of a child process should be captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capture {
    pub stdout: bool,
    pub stderr: bool,
}

impl Capture {
    /// Capture nothing; output is discarded.
    pub const NONE: Self = Self {
        stdout: false,
        stderr: false,
    };

    /// Capture both streams.
    pub const ALL: Self = Self {
        stdout: true,
        stderr: true,
    };
}

/// Result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl ProcessOutput {
    /// A successful exit with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            success: true,
            stdout: Some(stdout.into()),
            stderr: None,
        }
    }

    /// A failed exit with the given code and stderr.
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            success: false,
            stdout: None,
            stderr: Some(stderr.into()),
        }
    }
}

/// Spawns external processes and waits for them to finish.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs `program` with `args` and waits for it to exit.
    ///
    /// A nonzero exit is reported through [`ProcessOutput::success`], not as an
    /// error; errors are reserved for spawn failures and timeouts.
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        capture: Capture,
    ) -> Result<ProcessOutput, TranscodeError>;
}
