use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::AppConfig, ConfigError};

/// Environment variable prefix; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "MEDIA_ENCODER_";

/// Load configuration from defaults, an optional file and environment
/// variable overrides.
///
/// An explicitly given file must exist.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[engine]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
timeout_secs = 600

[output]
disambiguator = "Transcoded"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.engine.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.engine.timeout_secs, Some(600));
        assert_eq!(config.engine.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.output.disambiguator, "Transcoded");
        assert_eq!(config.sources.tag_mappings, PathBuf::from("config/tag_mappings.json"));
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        assert_eq!(load_config_from_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let result = load_config_from_str("[output]\nmax_unique_attempts = \"many\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.output.disambiguator, "Encoded");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[sources]
profiles = "/etc/media-encoder/profiles.json"

[output]
delete_original = true
"#
        )
        .unwrap();

        let config = load_config(Some(temp_file.path())).unwrap();
        assert_eq!(
            config.sources.profiles,
            PathBuf::from("/etc/media-encoder/profiles.json")
        );
        assert!(config.output.delete_original);
        assert_eq!(config.engine.log_level, "info");
    }
}
