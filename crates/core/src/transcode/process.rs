//! Process runner backed by `tokio::process`.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::error::TranscodeError;
use super::traits::{Capture, ProcessOutput, ProcessRunner};

/// Runs child processes with an optional wall-clock timeout.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner {
    timeout_secs: Option<u64>,
}

impl TokioProcessRunner {
    pub fn new(timeout_secs: Option<u64>) -> Self {
        Self { timeout_secs }
    }
}

fn stdio(capture: bool) -> Stdio {
    if capture {
        Stdio::piped()
    } else {
        Stdio::null()
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    fn name(&self) -> &str {
        "tokio"
    }

    async fn run(
        &self,
        program: &Path,
        args: &[String],
        capture: Capture,
    ) -> Result<ProcessOutput, TranscodeError> {
        debug!(program = %program.display(), args = ?args, "Spawning process");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(stdio(capture.stdout))
            .stderr(stdio(capture.stderr))
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::EngineNotFound {
                        path: program.to_path_buf(),
                    }
                } else {
                    TranscodeError::Io(e)
                }
            })?;

        let output = match self.timeout_secs {
            // Dropping the future drops the child, which kills it.
            Some(secs) => timeout(Duration::from_secs(secs), child.wait_with_output())
                .await
                .map_err(|_| TranscodeError::Timeout { timeout_secs: secs })??,
            None => child.wait_with_output().await?,
        };

        let text = |bytes: Vec<u8>, wanted: bool| {
            wanted.then(|| String::from_utf8_lossy(&bytes).into_owned())
        };

        Ok(ProcessOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: text(output.stdout, capture.stdout),
            stderr: text(output.stderr, capture.stderr),
        })
    }
}
