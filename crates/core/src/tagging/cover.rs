use lofty::picture::{MimeType, Picture, PictureType};
use std::path::Path;

use super::error::TagError;

/// Cover image bytes with the MIME type implied by the file extension.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverArt {
    mime: MimeType,
    data: Vec<u8>,
}

impl CoverArt {
    /// Reads a `.jpg`, `.jpeg` or `.png` image.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TagError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TagError::file_not_found(path));
        }

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let mime = match extension.as_str() {
            "jpg" | "jpeg" => MimeType::Jpeg,
            "png" => MimeType::Png,
            other => {
                return Err(TagError::metadata(format!(
                    "Unsupported image format: .{}",
                    other
                )))
            }
        };

        Ok(Self {
            mime,
            data: std::fs::read(path)?,
        })
    }

    pub fn mime_type(&self) -> &MimeType {
        &self.mime
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Front cover picture with an optional description.
    pub fn into_picture(self, description: Option<&str>) -> Picture {
        Picture::new_unchecked(
            PictureType::CoverFront,
            Some(self.mime),
            description.map(str::to_string),
            self.data,
        )
    }
}

/// Renders picture data for tag listings.
pub(crate) fn describe_picture(picture: &Picture) -> String {
    let mime = picture.mime_type().map(MimeType::as_str).unwrap_or("image");
    format!("<{}, {} bytes>", mime, picture.data().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_infers_mime_from_extension() {
        let dir = TempDir::new().unwrap();
        for (name, mime) in [
            ("a.jpg", MimeType::Jpeg),
            ("b.JPEG", MimeType::Jpeg),
            ("c.png", MimeType::Png),
        ] {
            let path = dir.path().join(name);
            std::fs::write(&path, [1u8, 2, 3]).unwrap();

            let cover = CoverArt::load(&path).unwrap();
            assert_eq!(cover.mime_type(), &mime);
            assert_eq!(cover.len(), 3);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cover.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let err = CoverArt::load(&path).unwrap_err();
        assert!(matches!(err, TagError::Metadata { .. }));
        assert!(err.to_string().starts_with("Unsupported image format"));
    }

    #[test]
    fn test_missing_file() {
        let err = CoverArt::load("/nonexistent/cover.jpg").unwrap_err();
        assert!(matches!(err, TagError::FileNotFound { .. }));
    }

    #[test]
    fn test_into_picture() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cover.png");
        std::fs::write(&path, vec![0u8; 16]).unwrap();

        let picture = CoverArt::load(&path).unwrap().into_picture(Some("Cover"));
        assert_eq!(picture.pic_type(), PictureType::CoverFront);
        assert_eq!(picture.description(), Some("Cover"));
        assert_eq!(describe_picture(&picture), "<image/png, 16 bytes>");
    }
}
