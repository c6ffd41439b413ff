//! Builder and executor for one engine invocation.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::error::TranscodeError;
use super::traits::{Capture, ProcessRunner};
use crate::args::ArgMap;

/// Lifecycle of a [`TranscodeCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Unconfigured,
    InputSet,
    OutputSet,
    Configured,
    Executed,
}

/// One invocation of the transcoding engine.
///
/// Setters can be called in any order and repeatedly; the last write wins.
/// Token order of the compiled command is fixed: executable, `-i`, input,
/// global arguments, `-metadata key=value` pairs, `-key value` output
/// arguments, output path.
#[derive(Debug, Clone)]
pub struct TranscodeCommand {
    executable: PathBuf,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    global_args: Vec<String>,
    output_args: ArgMap,
    metadata: ArgMap,
    state: CommandState,
}

impl TranscodeCommand {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            input: None,
            output: None,
            global_args: Vec::new(),
            output_args: ArgMap::new(),
            metadata: ArgMap::new(),
            state: CommandState::Unconfigured,
        }
    }

    pub fn set_input(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.input = Some(path.into());
        self.advance(CommandState::InputSet);
        self
    }

    pub fn set_output(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.output = Some(path.into());
        self.advance(CommandState::OutputSet);
        self
    }

    /// Replaces the formatted global argument tokens.
    pub fn set_global_args(&mut self, args: Vec<String>) -> &mut Self {
        self.global_args = args;
        self.advance(CommandState::Configured);
        self
    }

    /// Merges output arguments over those already set.
    pub fn set_output_args(&mut self, args: &ArgMap) -> &mut Self {
        self.output_args.merge(args);
        self.advance(CommandState::Configured);
        self
    }

    /// Merges metadata pairs over those already set.
    pub fn set_metadata(&mut self, metadata: &ArgMap) -> &mut Self {
        self.metadata.merge(metadata);
        self.advance(CommandState::Configured);
        self
    }

    fn advance(&mut self, to: CommandState) {
        if self.state != CommandState::Executed && to as u8 > self.state as u8 {
            self.state = to;
        }
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    /// The output path, falling back to the input for in-place writes.
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref().or(self.input.as_deref())
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Arguments after the executable.
    pub fn compile_args(&self) -> Result<Vec<String>, TranscodeError> {
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| TranscodeError::config("input file must be set"))?;
        let output = self.output.as_ref().unwrap_or(input);

        let mut args = vec!["-i".to_string(), input.to_string_lossy().into_owned()];
        args.extend(self.global_args.iter().cloned());

        for (key, value) in self.metadata.iter() {
            args.push("-metadata".to_string());
            args.push(format!("{}={}", key, value));
        }

        for (key, value) in self.output_args.iter() {
            args.push(format!("-{}", key.trim_start_matches('-')));
            if !value.is_empty() {
                args.push(value.to_string());
            }
        }

        args.push(output.to_string_lossy().into_owned());
        Ok(args)
    }

    /// Full token list, executable first.
    pub fn compile(&self) -> Result<Vec<String>, TranscodeError> {
        let mut tokens = vec![self.executable.to_string_lossy().into_owned()];
        tokens.extend(self.compile_args()?);
        Ok(tokens)
    }

    /// Runs the command, returning stdout when it was captured.
    ///
    /// A nonzero exit becomes [`TranscodeError::Execution`] carrying the
    /// captured stderr and stdout.
    pub async fn run(
        &mut self,
        runner: &dyn ProcessRunner,
        capture: Capture,
    ) -> Result<Option<String>, TranscodeError> {
        let args = self.compile_args()?;
        debug!(
            command = %format!("{} {}", self.executable.display(), args.join(" ")),
            "Running engine command"
        );

        let output = runner.run(&self.executable, &args, capture).await?;
        self.state = CommandState::Executed;

        if !output.success {
            error!(code = ?output.code, stderr = ?output.stderr, "Engine command failed");
            return Err(TranscodeError::execution(
                format!("engine exited with code {:?}", output.code),
                output.stderr,
                output.stdout,
            ));
        }

        if let Some(path) = self.output() {
            info!(output = %path.display(), "Executed");
        }
        Ok(output.stdout)
    }
}
