//! Mock process runner for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transcode::{Capture, ProcessOutput, ProcessRunner, TranscodeError};

/// A recorded process invocation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub capture: Capture,
}

/// Mock implementation of the ProcessRunner trait.
///
/// Provides controllable behavior for testing:
/// - Track invocations for assertions
/// - Queue exit results, one per call
/// - Fail the next call with a given error
/// - Write a fake output file to the last argument, like an encoder would
///
/// # Example
///
/// ```rust,ignore
/// use media_encoder_core::testing::MockRunner;
///
/// let runner = MockRunner::new();
/// runner.set_output_file_bytes(Some(512)).await;
///
/// let mut cmd = TranscodeCommand::new("ffmpeg");
/// cmd.set_input("in.wav").set_output("out.mp3");
/// cmd.run(&runner, Capture::ALL).await?;
///
/// assert_eq!(runner.calls().await.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockRunner {
    /// Recorded invocations.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// Queued results; a successful empty result is used when exhausted.
    outputs: Arc<RwLock<VecDeque<ProcessOutput>>>,
    /// If set, the next call fails with this error.
    next_error: Arc<RwLock<Option<TranscodeError>>>,
    /// Size of the file written to the last argument on success.
    output_file_bytes: Arc<RwLock<Option<usize>>>,
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of a future call.
    pub async fn push_output(&self, output: ProcessOutput) {
        self.outputs.write().await.push_back(output);
    }

    /// Make the next call fail with the given error.
    pub async fn set_next_error(&self, error: TranscodeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Write a file of `bytes` zero bytes to the last argument after each
    /// successful call. `None` disables it.
    pub async fn set_output_file_bytes(&self, bytes: Option<usize>) {
        *self.output_file_bytes.write().await = bytes;
    }

    /// All recorded invocations.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn clear(&self) {
        self.calls.write().await.clear();
        self.outputs.write().await.clear();
        *self.next_error.write().await = None;
    }
}

#[async_trait]
impl ProcessRunner for MockRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(
        &self,
        program: &Path,
        args: &[String],
        capture: Capture,
    ) -> Result<ProcessOutput, TranscodeError> {
        self.calls.write().await.push(RecordedCall {
            program: program.to_path_buf(),
            args: args.to_vec(),
            capture,
        });

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let output = self
            .outputs
            .write()
            .await
            .pop_front()
            .unwrap_or_else(|| ProcessOutput::success(""));

        if output.success {
            if let (Some(bytes), Some(target)) = (*self.output_file_bytes.read().await, args.last())
            {
                tokio::fs::write(target, vec![0u8; bytes]).await?;
            }
        }

        Ok(output)
    }
}
