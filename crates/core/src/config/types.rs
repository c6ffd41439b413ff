use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transcode::{EncoderConfig, EngineConfig, OutputConfig};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// Settings consumed by the encoder.
    pub fn encoder(&self) -> EncoderConfig {
        EncoderConfig {
            engine: self.engine.clone(),
            output: self.output.clone(),
        }
    }
}

/// Locations of the profile, global-argument and tag-mapping sources.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default = "default_profiles")]
    pub profiles: PathBuf,
    #[serde(default = "default_global_arguments")]
    pub global_arguments: PathBuf,
    #[serde(default = "default_tag_mappings")]
    pub tag_mappings: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            profiles: default_profiles(),
            global_arguments: default_global_arguments(),
            tag_mappings: default_tag_mappings(),
        }
    }
}

fn default_profiles() -> PathBuf {
    PathBuf::from("config/profiles.json")
}

fn default_global_arguments() -> PathBuf {
    PathBuf::from("config/global_arguments.json")
}

fn default_tag_mappings() -> PathBuf {
    PathBuf::from("config/tag_mappings.json")
}
