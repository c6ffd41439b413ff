//! Profile catalog loading and lookup.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::error::CatalogError;
use super::types::{GlobalArgument, Profile, ProfileSource};
use crate::args::ArgMap;

/// Loaded encoding profiles and global argument defaults.
///
/// Built once with [`ProfileCatalog::load_profiles`] and optionally
/// [`ProfileCatalog::load_global_arguments`]; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProfileCatalog {
    profiles: Vec<Profile>,
    /// Lowercased name -> index into `profiles`.
    by_name: HashMap<String, usize>,
    arguments: Vec<GlobalArgument>,
}

impl ProfileCatalog {
    /// Builds a catalog from already parsed profiles.
    pub fn from_profiles(profiles: Vec<Profile>) -> Result<Self, CatalogError> {
        Self::index(profiles, Path::new("<memory>"))
    }

    /// Loads profiles from a JSON source with a top-level `Profiles` list.
    pub fn load_profiles(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = read_source(path)?;
        Self::profiles_from_str(&content, path)
    }

    pub(crate) fn profiles_from_str(content: &str, origin: &Path) -> Result<Self, CatalogError> {
        let source: ProfileSource = serde_json::from_str(content)
            .map_err(|e| CatalogError::load(origin, e.to_string()))?;
        Self::index(source.profiles, origin)
    }

    /// Loads the global argument table, replacing any previously loaded one.
    pub fn load_global_arguments(mut self, path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = read_source(path)?;
        self.arguments = arguments_from_str(&content, path)?;
        Ok(self)
    }

    pub(crate) fn with_arguments(mut self, arguments: Vec<GlobalArgument>) -> Self {
        self.arguments = arguments;
        self
    }

    fn index(profiles: Vec<Profile>, origin: &Path) -> Result<Self, CatalogError> {
        let mut by_name = HashMap::with_capacity(profiles.len());
        for (position, profile) in profiles.iter().enumerate() {
            if profile.name.trim().is_empty() {
                return Err(CatalogError::load(origin, "profile with an empty name"));
            }
            if !profile.extension.starts_with('.') {
                return Err(CatalogError::load(
                    origin,
                    format!(
                        "profile '{}' has extension '{}' without a leading '.'",
                        profile.name, profile.extension
                    ),
                ));
            }
            profile.output_args_map().map_err(|e| {
                CatalogError::load(origin, format!("profile '{}': {}", profile.name, e))
            })?;
            if by_name
                .insert(profile.name.to_lowercase(), position)
                .is_some()
            {
                return Err(CatalogError::load(
                    origin,
                    format!("duplicate profile name '{}'", profile.name),
                ));
            }
        }

        debug!(origin = %origin.display(), count = profiles.len(), "Loaded profiles");

        Ok(Self {
            profiles,
            by_name,
            arguments: Vec::new(),
        })
    }

    /// All profiles in source order.
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn global_arguments(&self) -> &[GlobalArgument] {
        &self.arguments
    }

    /// Case-insensitive exact name lookup.
    pub fn profile_by_name(&self, name: &str) -> Result<&Profile, CatalogError> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&i| &self.profiles[i])
            .ok_or_else(|| CatalogError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn profiles_by_codec(&self, codec: &str) -> Vec<&Profile> {
        self.profiles
            .iter()
            .filter(|p| p.codec.eq_ignore_ascii_case(codec))
            .collect()
    }

    pub fn profiles_by_extension(&self, extension: &str) -> Vec<&Profile> {
        self.profiles
            .iter()
            .filter(|p| p.extension.eq_ignore_ascii_case(extension))
            .collect()
    }

    /// Global arguments flattened to name -> default, in source order.
    pub fn arguments_as_defaults_map(&self) -> ArgMap {
        self.arguments
            .iter()
            .map(|a| (a.name.as_str(), a.default.as_str()))
            .collect()
    }
}

pub(crate) fn arguments_from_str(
    content: &str,
    origin: &Path,
) -> Result<Vec<GlobalArgument>, CatalogError> {
    serde_json::from_str(content).map_err(|e| CatalogError::load(origin, e.to_string()))
}

fn read_source(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|e| CatalogError::load(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PROFILES: &str = r#"{
        "Profiles": [
            {
                "Name": "MP3 Standard 320kbps",
                "Codec": "mp3",
                "Extension": ".mp3",
                "FFmpegSetup": "c=libmp3lame,b=320k",
                "SizeFactor": 0.23,
                "CpuFactor": 1.0,
                "Description": "CBR MP3"
            },
            {
                "Name": "MP3 V0",
                "Codec": "MP3",
                "Extension": ".MP3",
                "FFmpegSetup": {"c": "libmp3lame", "q": "0"},
                "SizeFactor": "0.2",
                "CpuFactor": 1.1
            },
            {
                "Name": "FLAC Archive",
                "Codec": "flac",
                "Extension": ".flac",
                "FFmpegSetup": "c=flac,compression_level=8",
                "SizeFactor": 0.6,
                "CpuFactor": 2.0
            }
        ]
    }"#;

    const ARGUMENTS: &str = r#"[
        {"Name": "-y", "Default": "", "Description": "Overwrite output"},
        {"Name": "-loglevel", "Default": "error", "Description": "Engine verbosity"},
        {"Name": "-hide_banner", "Default": null}
    ]"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn catalog() -> ProfileCatalog {
        ProfileCatalog::profiles_from_str(PROFILES, Path::new("test.json")).unwrap()
    }

    #[test]
    fn test_profile_by_name_is_case_insensitive() {
        let catalog = catalog();
        let profile = catalog.profile_by_name("mp3 standard 320KBPS").unwrap();
        assert_eq!(profile.name, "MP3 Standard 320kbps");
        assert_eq!(profile.codec, "mp3");
        assert_eq!(profile.extension, ".mp3");
        assert_eq!(profile.description, "CBR MP3");
    }

    #[test]
    fn test_profile_by_name_not_found() {
        let err = catalog().profile_by_name("Opus").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { ref name } if name == "Opus"));
    }

    #[test]
    fn test_filters_are_case_insensitive_and_never_fail() {
        let catalog = catalog();
        assert_eq!(catalog.profiles_by_codec("mp3").len(), 2);
        assert_eq!(catalog.profiles_by_extension(".mp3").len(), 2);
        assert_eq!(catalog.profiles_by_extension(".FLAC").len(), 1);
        assert!(catalog.profiles_by_codec("vorbis").is_empty());
    }

    #[test]
    fn test_load_profiles_from_file() {
        let file = write_temp(PROFILES);
        let catalog = ProfileCatalog::load_profiles(file.path()).unwrap();
        assert_eq!(catalog.profiles().len(), 3);
        let args = catalog
            .profile_by_name("FLAC Archive")
            .unwrap()
            .output_args_map()
            .unwrap();
        assert_eq!(args.get("compression_level"), Some("8"));
    }

    #[test]
    fn test_load_profiles_missing_file() {
        let err = ProfileCatalog::load_profiles("/nonexistent/profiles.json").unwrap_err();
        assert!(matches!(err, CatalogError::Load { .. }));
    }

    #[test]
    fn test_load_profiles_missing_field() {
        let json = r#"{"Profiles": [{"Name": "X", "Codec": "mp3", "Extension": ".mp3",
            "FFmpegSetup": "c=libmp3lame", "SizeFactor": 1.0}]}"#;
        let err = ProfileCatalog::profiles_from_str(json, Path::new("x.json")).unwrap_err();
        assert!(err.to_string().contains("CpuFactor"));
    }

    #[test]
    fn test_load_profiles_rejects_malformed_setup_at_load() {
        let json = r#"{"Profiles": [{"Name": "X", "Codec": "mp3", "Extension": ".mp3",
            "FFmpegSetup": "c=libmp3lame,oops", "SizeFactor": 1.0, "CpuFactor": 1.0}]}"#;
        let err = ProfileCatalog::profiles_from_str(json, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Load { .. }));
        assert!(err.to_string().contains("oops"));
    }

    #[test]
    fn test_load_profiles_rejects_duplicates() {
        let json = r#"{"Profiles": [
            {"Name": "A", "Codec": "mp3", "Extension": ".mp3", "FFmpegSetup": "", "SizeFactor": 1, "CpuFactor": 1},
            {"Name": "a", "Codec": "mp3", "Extension": ".mp3", "FFmpegSetup": "", "SizeFactor": 1, "CpuFactor": 1}
        ]}"#;
        let err = ProfileCatalog::profiles_from_str(json, Path::new("x.json")).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_load_profiles_rejects_extension_without_dot() {
        let json = r#"{"Profiles": [{"Name": "A", "Codec": "mp3", "Extension": "mp3",
            "FFmpegSetup": "", "SizeFactor": 1, "CpuFactor": 1}]}"#;
        assert!(ProfileCatalog::profiles_from_str(json, Path::new("x.json")).is_err());
    }

    #[test]
    fn test_load_global_arguments() {
        let profiles = write_temp(PROFILES);
        let arguments = write_temp(ARGUMENTS);
        let catalog = ProfileCatalog::load_profiles(profiles.path())
            .unwrap()
            .load_global_arguments(arguments.path())
            .unwrap();

        let defaults = catalog.arguments_as_defaults_map();
        assert_eq!(
            defaults.iter().collect::<Vec<_>>(),
            vec![("-y", ""), ("-loglevel", "error"), ("-hide_banner", "")]
        );
    }

    #[test]
    fn test_load_global_arguments_malformed() {
        let arguments = write_temp(r#"{"not": "a list"}"#);
        let err = catalog().load_global_arguments(arguments.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Load { .. }));
    }
}
