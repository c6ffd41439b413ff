//! Probe tool invocation and output parsing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::error::TranscodeError;
use super::traits::{Capture, ProcessRunner};

/// Container-level section of the probe output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeFormat {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub format_name: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub bit_rate: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// One stream of the probe output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeStream {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub codec_type: String,
    #[serde(default)]
    pub codec_name: Option<String>,
    #[serde(default)]
    pub sample_rate: Option<String>,
    #[serde(default)]
    pub channels: Option<u8>,
    #[serde(default)]
    pub bit_rate: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Parsed probe result: format, streams and their tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub format: ProbeFormat,
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

impl MediaMetadata {
    /// Parses the probe tool's JSON output.
    pub fn parse(output: &str) -> Result<Self, TranscodeError> {
        serde_json::from_str(output)
            .map_err(|e| TranscodeError::probe(format!("Failed to parse probe output: {}", e)))
    }

    /// Looks up a container tag ignoring key case.
    pub fn format_tag(&self, key: &str) -> Option<&str> {
        self.format
            .tags
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.format.duration.as_ref()?.parse().ok()
    }

    /// Codec of the first audio stream.
    pub fn audio_codec(&self) -> Option<&str> {
        self.streams
            .iter()
            .find(|s| s.codec_type == "audio")
            .and_then(|s| s.codec_name.as_deref())
    }
}

/// Runs the probe executable against `path`.
pub async fn probe(
    runner: &dyn ProcessRunner,
    probe_executable: &Path,
    path: &Path,
) -> Result<MediaMetadata, TranscodeError> {
    let args = vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        path.to_string_lossy().into_owned(),
    ];
    debug!(path = %path.display(), "Probing media file");

    let output = runner.run(probe_executable, &args, Capture::ALL).await?;
    if !output.success {
        return Err(TranscodeError::probe(format!(
            "probe exited with code {:?}: {}",
            output.code,
            output.stderr.unwrap_or_default().trim()
        )));
    }

    MediaMetadata::parse(output.stdout.as_deref().unwrap_or_default())
}
