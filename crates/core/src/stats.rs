//! Input/output file size comparison.

use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::transcode::TranscodeError;

/// Direction of the size change from input to output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeChange {
    Larger,
    Smaller,
    Equal,
}

/// Sizes of an input and output file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeComparison {
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// `output / input`; infinite for an empty input with non-empty output,
    /// `1.0` when both are empty.
    pub ratio: f64,
    pub change: SizeChange,
}

impl SizeComparison {
    pub fn from_sizes(input_bytes: u64, output_bytes: u64) -> Self {
        let ratio = match (input_bytes, output_bytes) {
            (0, 0) => 1.0,
            (0, _) => f64::INFINITY,
            (i, o) => o as f64 / i as f64,
        };
        let change = match output_bytes.cmp(&input_bytes) {
            std::cmp::Ordering::Greater => SizeChange::Larger,
            std::cmp::Ordering::Less => SizeChange::Smaller,
            std::cmp::Ordering::Equal => SizeChange::Equal,
        };
        Self {
            input_bytes,
            output_bytes,
            ratio,
            change,
        }
    }

    /// Reads both file sizes from disk.
    pub fn compare(input: &Path, output: &Path) -> Result<Self, TranscodeError> {
        Ok(Self::from_sizes(file_size(input)?, file_size(output)?))
    }

    pub fn difference(&self) -> u64 {
        self.input_bytes.abs_diff(self.output_bytes)
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        match self.change {
            SizeChange::Larger => format!(
                "The output file is {} larger than the source file.",
                format_size(self.difference())
            ),
            SizeChange::Smaller => format!(
                "The output file is {} smaller than the source file.",
                format_size(self.difference())
            ),
            SizeChange::Equal => "The output file is the same size as the source file.".to_string(),
        }
    }

    pub fn log(&self) {
        debug!(size = %format_size(self.input_bytes), "Source file size");
        debug!(size = %format_size(self.output_bytes), "Output file size");
        info!("{}", self.summary());
        info!(ratio = %format!("{:.2}", self.ratio), "Size ratio (output/source)");
    }
}

fn file_size(path: &Path) -> Result<u64, TranscodeError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| TranscodeError::file_system(path, e))
}

/// Formats a byte count with 1024-based units.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024 / 2), "1.50 GB");
    }

    #[test]
    fn test_ratio_and_change() {
        let smaller = SizeComparison::from_sizes(1000, 250);
        assert_eq!(smaller.change, SizeChange::Smaller);
        assert!((smaller.ratio - 0.25).abs() < f64::EPSILON);
        assert_eq!(smaller.difference(), 750);

        let larger = SizeComparison::from_sizes(100, 300);
        assert_eq!(larger.change, SizeChange::Larger);
        assert!(larger.summary().contains("larger"));

        assert_eq!(SizeComparison::from_sizes(7, 7).change, SizeChange::Equal);
    }

    #[test]
    fn test_empty_input_ratio() {
        assert!(SizeComparison::from_sizes(0, 10).ratio.is_infinite());
        assert_eq!(SizeComparison::from_sizes(0, 0).ratio, 1.0);
    }

    #[test]
    fn test_compare_files() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.mp3");
        std::fs::write(&input, vec![0u8; 2048]).unwrap();
        std::fs::write(&output, vec![0u8; 512]).unwrap();

        let cmp = SizeComparison::compare(&input, &output).unwrap();
        assert_eq!(cmp.input_bytes, 2048);
        assert_eq!(cmp.output_bytes, 512);
        assert_eq!(cmp.summary(), "The output file is 1.50 KB smaller than the source file.");
    }

    #[test]
    fn test_compare_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = SizeComparison::compare(&dir.path().join("a"), &dir.path().join("b"))
            .unwrap_err();
        assert!(matches!(err, TranscodeError::FileSystem { .. }));
    }
}
