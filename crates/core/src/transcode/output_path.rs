//! Collision-free output path generation.

use std::path::{Path, PathBuf};

use super::error::TranscodeError;

/// Finds the first free output path for `base` with `extension`.
///
/// Candidates, in order: `{stem}{ext}`, `{stem}_{disambiguator}{ext}`, then
/// `{stem}_{disambiguator}-1{ext}`, `-2`, ... The original extension of
/// `base` is replaced. Gives up after `max_attempts` candidates.
pub fn unique_output_path(
    base: &Path,
    extension: &str,
    disambiguator: &str,
    max_attempts: u32,
) -> Result<PathBuf, TranscodeError> {
    let stem = base.with_extension("");
    let stem = stem.to_string_lossy();

    for attempt in 0..max_attempts {
        let candidate = match attempt {
            0 => format!("{}{}", stem, extension),
            1 => format!("{}_{}{}", stem, disambiguator, extension),
            n => format!("{}_{}-{}{}", stem, disambiguator, n - 1, extension),
        };
        let candidate = PathBuf::from(candidate);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(TranscodeError::UniquePathExhausted {
        base: base.to_path_buf(),
        attempts: max_attempts,
    })
}
