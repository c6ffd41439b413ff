//! Profile-driven encode and stream-copy pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::command::TranscodeCommand;
use super::config::EncoderConfig;
use super::error::TranscodeError;
use super::output_path::unique_output_path;
use super::probe::{probe, MediaMetadata};
use super::traits::{Capture, ProcessRunner};
use crate::args::{ArgMap, ArgumentComposer};
use crate::profile::{Profile, ProfileCatalog};
use crate::stats::SizeComparison;

/// One encode or copy job.
#[derive(Debug, Clone, Default)]
pub struct EncodeRequest {
    pub input: PathBuf,
    /// Target path; the input path is used when absent. Its extension is
    /// replaced by the profile's.
    pub output: Option<PathBuf>,
    pub metadata: ArgMap,
    /// User output arguments, layered over the profile defaults.
    pub output_args: ArgMap,
    /// User global arguments, layered over the catalog defaults.
    pub global_args: ArgMap,
    /// Overrides the configured `delete_original` when set.
    pub delete_original: Option<bool>,
}

impl EncodeRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_metadata(mut self, metadata: ArgMap) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_output_args(mut self, args: ArgMap) -> Self {
        self.output_args = args;
        self
    }

    pub fn with_global_args(mut self, args: ArgMap) -> Self {
        self.global_args = args;
        self
    }

    pub fn with_delete_original(mut self, delete: bool) -> Self {
        self.delete_original = Some(delete);
        self
    }
}

/// Result of a successful encode.
#[derive(Debug, Clone)]
pub struct EncodeOutcome {
    pub output: PathBuf,
    pub sizes: SizeComparison,
    pub original_deleted: bool,
}

/// Encodes files with one profile of a catalog.
pub struct Encoder {
    catalog: Arc<ProfileCatalog>,
    profile: Profile,
    runner: Arc<dyn ProcessRunner>,
    config: EncoderConfig,
}

impl Encoder {
    /// Binds the named profile. Fails when the catalog has no such profile.
    pub fn new(
        catalog: Arc<ProfileCatalog>,
        profile_name: &str,
        runner: Arc<dyn ProcessRunner>,
        config: EncoderConfig,
    ) -> Result<Self, TranscodeError> {
        let profile = catalog.profile_by_name(profile_name)?.clone();
        Ok(Self {
            catalog,
            profile,
            runner,
            config,
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Re-encodes `request.input` with the bound profile.
    pub async fn encode(&self, request: EncodeRequest) -> Result<EncodeOutcome, TranscodeError> {
        let input = request.input.as_path();
        if !input.is_file() {
            return Err(TranscodeError::validation(format!(
                "File does not exist: {}",
                input.display()
            )));
        }

        // In-place is decided on the requested target, not the generated one.
        let in_place = request
            .output
            .as_deref()
            .is_some_and(|target| same_path(target, input));
        let output = unique_output_path(
            request.output.as_deref().unwrap_or(input),
            &self.profile.extension,
            &self.config.output.disambiguator,
            self.config.output.max_unique_attempts,
        )?;

        let mut global_overrides = ArgMap::new();
        if !self.config.engine.log_level.is_empty() {
            global_overrides.insert("-loglevel", self.config.engine.log_level.as_str());
        }
        if in_place {
            global_overrides.insert("-y", "");
        }
        global_overrides.merge(&request.global_args);

        let composed = ArgumentComposer::new(self.profile.output_args_map()?)
            .with_output_args(&request.output_args)
            .with_metadata(&request.metadata)
            .with_global_defaults(&self.catalog.arguments_as_defaults_map())
            .with_global_args(&global_overrides)
            .compose();

        let mut command = TranscodeCommand::new(&self.config.engine.ffmpeg_path);
        command
            .set_input(input)
            .set_output(&output)
            .set_global_args(composed.global_args)
            .set_metadata(&composed.metadata)
            .set_output_args(&composed.output_args);

        info!(
            profile = %self.profile.name,
            input = %input.display(),
            output = %output.display(),
            "Encoding"
        );
        command.run(self.runner.as_ref(), Capture::ALL).await?;

        let sizes = SizeComparison::compare(input, &output)?;
        sizes.log();

        let delete = request
            .delete_original
            .unwrap_or(self.config.output.delete_original);
        let original_deleted = delete && !in_place && remove_original(input);

        Ok(EncodeOutcome {
            output,
            sizes,
            original_deleted,
        })
    }

    /// Remuxes without re-encoding: `c=copy` is forced into the user layer.
    pub async fn copy(&self, mut request: EncodeRequest) -> Result<EncodeOutcome, TranscodeError> {
        info!(input = %request.input.display(), "Copying");
        request.output_args.insert("c", "copy");
        self.encode(request).await
    }

    /// Probes `path` with the configured probe executable.
    pub async fn probe(&self, path: &Path) -> Result<MediaMetadata, TranscodeError> {
        probe(self.runner.as_ref(), &self.config.engine.ffprobe_path, path).await
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn remove_original(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Deleted original file");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to delete original file");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockRunner};
    use crate::transcode::ProcessOutput;
    use tempfile::TempDir;

    fn catalog() -> Arc<ProfileCatalog> {
        let catalog = ProfileCatalog::from_profiles(vec![
            fixtures::mp3_profile(),
            fixtures::profile("FLAC", ".flac", "c=flac"),
            fixtures::profile("WAV", ".wav", "c=pcm_s16le"),
        ])
        .unwrap()
        .with_arguments(vec![
            fixtures::global_argument("-hide_banner", ""),
            fixtures::global_argument("-loglevel", "error"),
        ]);
        Arc::new(catalog)
    }

    async fn setup() -> (TempDir, PathBuf, Arc<MockRunner>) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("song.wav");
        std::fs::write(&input, fixtures::wav_bytes(4000)).unwrap();
        let runner = Arc::new(MockRunner::new());
        runner.set_output_file_bytes(Some(1000)).await;
        (dir, input, runner)
    }

    fn encoder(runner: &Arc<MockRunner>, profile: &str) -> Encoder {
        Encoder::new(catalog(), profile, runner.clone(), EncoderConfig::default()).unwrap()
    }

    #[test]
    fn test_unknown_profile() {
        let result = Encoder::new(
            catalog(),
            "Opus",
            Arc::new(MockRunner::new()),
            EncoderConfig::default(),
        );
        assert!(matches!(
            result,
            Err(TranscodeError::Arguments(crate::profile::CatalogError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_encode_builds_command() {
        let (dir, input, runner) = setup().await;
        let encoder = encoder(&runner, "mp3 standard 320kbps");

        let request = EncodeRequest::new(&input)
            .with_metadata(ArgMap::from_iter([("title", "Song")]))
            .with_output_args(ArgMap::from_iter([("b", "256k")]));
        let outcome = encoder.encode(request).await.unwrap();

        assert_eq!(outcome.output, dir.path().join("song.mp3"));
        assert_eq!(outcome.sizes.output_bytes, 1000);
        assert!(!outcome.original_deleted);

        let calls = runner.calls().await;
        assert_eq!(calls[0].program, PathBuf::from("ffmpeg"));
        assert_eq!(
            calls[0].args,
            vec![
                "-i".to_string(),
                input.to_string_lossy().into_owned(),
                "-hide_banner".to_string(),
                "-loglevel".to_string(),
                "info".to_string(),
                "-metadata".to_string(),
                "title=Song".to_string(),
                "-c".to_string(),
                "libmp3lame".to_string(),
                "-b".to_string(),
                "256k".to_string(),
                dir.path().join("song.mp3").to_string_lossy().into_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn test_encode_missing_input_has_no_side_effect() {
        let (dir, _input, runner) = setup().await;
        let encoder = encoder(&runner, "FLAC");

        let err = encoder
            .encode(EncodeRequest::new(dir.path().join("missing.wav")))
            .await
            .unwrap_err();

        assert!(matches!(err, TranscodeError::Validation { .. }));
        assert!(runner.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_encode_disambiguates_existing_output() {
        let (dir, input, runner) = setup().await;
        std::fs::write(dir.path().join("song.mp3"), b"existing").unwrap();
        let encoder = encoder(&runner, "MP3 Standard 320kbps");

        let outcome = encoder.encode(EncodeRequest::new(&input)).await.unwrap();
        assert_eq!(outcome.output, dir.path().join("song_Encoded.mp3"));
        assert_eq!(std::fs::read(dir.path().join("song.mp3")).unwrap(), b"existing");
    }

    #[tokio::test]
    async fn test_engine_failure_leaves_original() {
        let (_dir, input, runner) = setup().await;
        runner
            .push_output(ProcessOutput::failure(1, "Invalid data found"))
            .await;
        let encoder = encoder(&runner, "FLAC");

        let err = encoder
            .encode(EncodeRequest::new(&input).with_delete_original(true))
            .await
            .unwrap_err();

        assert_eq!(err.stderr(), Some("Invalid data found"));
        assert!(input.exists());
    }

    #[tokio::test]
    async fn test_in_place_encode_overwrites_and_keeps_source() {
        let (dir, input, runner) = setup().await;
        let encoder = encoder(&runner, "WAV");

        let outcome = encoder
            .encode(
                EncodeRequest::new(&input)
                    .with_output(&input)
                    .with_delete_original(true),
            )
            .await
            .unwrap();

        assert_eq!(outcome.output, dir.path().join("song_Encoded.wav"));
        assert!(!outcome.original_deleted);
        assert!(input.exists());
        let calls = runner.calls().await;
        assert!(calls[0].args.iter().any(|a| a == "-y"));
    }

    #[tokio::test]
    async fn test_in_place_detects_equivalent_path() {
        let (dir, input, runner) = setup().await;
        let encoder = encoder(&runner, "WAV");
        let dotted = dir.path().join(".").join("song.wav");

        let outcome = encoder
            .encode(
                EncodeRequest::new(&input)
                    .with_output(dotted)
                    .with_delete_original(true),
            )
            .await
            .unwrap();

        assert!(!outcome.original_deleted);
        assert!(input.exists());
    }

    #[tokio::test]
    async fn test_delete_original_after_success() {
        let (_dir, input, runner) = setup().await;
        let encoder = encoder(&runner, "FLAC");

        let outcome = encoder
            .encode(EncodeRequest::new(&input).with_delete_original(true))
            .await
            .unwrap();

        assert!(outcome.original_deleted);
        assert!(!input.exists());
        assert!(outcome.output.exists());
    }

    #[tokio::test]
    async fn test_copy_forces_stream_copy() {
        let (_dir, input, runner) = setup().await;
        let encoder = encoder(&runner, "MP3 Standard 320kbps");

        encoder
            .copy(
                EncodeRequest::new(&input)
                    .with_metadata(ArgMap::from_iter([("artist", "Band")]))
                    .with_output_args(ArgMap::from_iter([("c", "libmp3lame")])),
            )
            .await
            .unwrap();

        let args = &runner.calls().await[0].args;
        let c = args.iter().position(|a| a == "-c").unwrap();
        assert_eq!(args[c + 1], "copy");
        assert!(args.contains(&"artist=Band".to_string()));
    }

    #[tokio::test]
    async fn test_user_global_args_override_config_log_level() {
        let (_dir, input, runner) = setup().await;
        let encoder = encoder(&runner, "FLAC");

        encoder
            .encode(
                EncodeRequest::new(&input)
                    .with_global_args(ArgMap::from_iter([("-loglevel", "debug")])),
            )
            .await
            .unwrap();

        let args = &runner.calls().await[0].args;
        let level = args.iter().position(|a| a == "-loglevel").unwrap();
        assert_eq!(args[level + 1], "debug");
    }
}
