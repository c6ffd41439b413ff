//! Types for the profile catalog.

use serde::{Deserialize, Deserializer, Serialize};

use super::error::CatalogError;
use crate::args::ArgMap;

/// Output arguments of a profile, as written in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputArgs {
    /// Comma joined `key=value` pairs, e.g. `"c=libmp3lame,b=320k"`.
    Encoded(String),
    /// Mapping of argument names to values.
    Map(ArgMap),
}

impl OutputArgs {
    /// Parses the arguments into an ordered map.
    pub fn to_map(&self) -> Result<ArgMap, CatalogError> {
        match self {
            Self::Encoded(encoded) => ArgMap::parse(encoded),
            Self::Map(map) => Ok(map.clone()),
        }
    }
}

impl std::fmt::Display for OutputArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encoded(encoded) => f.write_str(encoded),
            Self::Map(map) => {
                let joined = map
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(",");
                f.write_str(&joined)
            }
        }
    }
}

/// A named, immutable bundle of codec and output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Codec")]
    pub codec: String,
    /// Output file extension including the leading dot.
    #[serde(rename = "Extension")]
    pub extension: String,
    #[serde(rename = "FFmpegSetup")]
    pub output_args: OutputArgs,
    /// Expected output size relative to the input.
    #[serde(rename = "SizeFactor", deserialize_with = "lenient_f64")]
    pub size_factor: f64,
    /// Encoding cost relative to a baseline.
    #[serde(rename = "CpuFactor", deserialize_with = "lenient_f64")]
    pub cpu_factor: f64,
    #[serde(rename = "Description", default)]
    pub description: String,
}

impl Profile {
    /// The profile's default output arguments as an ordered map.
    pub fn output_args_map(&self) -> Result<ArgMap, CatalogError> {
        self.output_args.to_map()
    }
}

/// An engine-wide argument with its default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalArgument {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Default", deserialize_with = "nullable_string")]
    pub default: String,
    #[serde(rename = "Description", default)]
    pub description: String,
}

/// Top-level shape of the profile source.
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileSource {
    #[serde(rename = "Profiles")]
    pub profiles: Vec<Profile>,
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("'{}' is not a number", s))),
    }
}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
