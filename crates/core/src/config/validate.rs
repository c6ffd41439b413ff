use super::{types::AppConfig, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Engine executable paths are not empty
/// - Disambiguator is a non-empty file name fragment
/// - Unique-name attempt bound is not 0
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.engine.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.ffmpeg_path cannot be empty".to_string(),
        ));
    }
    if config.engine.ffprobe_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.ffprobe_path cannot be empty".to_string(),
        ));
    }

    let disambiguator = config.output.disambiguator.trim();
    if disambiguator.is_empty() {
        return Err(ConfigError::ValidationError(
            "output.disambiguator cannot be empty".to_string(),
        ));
    }
    if disambiguator.contains(['/', '\\']) {
        return Err(ConfigError::ValidationError(format!(
            "output.disambiguator cannot contain path separators: {}",
            disambiguator
        )));
    }

    if config.output.max_unique_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "output.max_unique_attempts cannot be 0".to_string(),
        ));
    }

    Ok(())
}
