//! Configuration for invoking the external engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine executables and invocation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the transcoding executable.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to the probe executable.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Kill the engine after this many seconds. No limit when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Engine `-loglevel`, used when the caller supplies none.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            timeout_secs: None,
            log_level: default_log_level(),
        }
    }
}

/// Output naming and cleanup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Suffix inserted when the plain output name is taken.
    #[serde(default = "default_disambiguator")]
    pub disambiguator: String,

    /// Delete the source file after a successful encode.
    #[serde(default)]
    pub delete_original: bool,

    /// Upper bound on candidate output names.
    #[serde(default = "default_max_unique_attempts")]
    pub max_unique_attempts: u32,
}

fn default_disambiguator() -> String {
    "Encoded".to_string()
}

fn default_max_unique_attempts() -> u32 {
    1000
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            disambiguator: default_disambiguator(),
            delete_original: false,
            max_unique_attempts: default_max_unique_attempts(),
        }
    }
}

/// Settings an [`Encoder`](super::Encoder) runs with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl EngineConfig {
    /// Creates a config with custom executable paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}
