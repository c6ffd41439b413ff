//! Open audio files and dispatch tag edits to the container's native tag.

use lofty::aac::AacFile;
use lofty::config::{ParseOptions, WriteOptions};
use lofty::error::LoftyError;
use lofty::file::AudioFile;
use lofty::flac::FlacFile;
use lofty::id3::v2::Id3v2Tag;
use lofty::iff::aiff::AiffFile;
use lofty::iff::wav::WavFile;
use lofty::mp4::{Ilst, Mp4File};
use lofty::mpeg::MpegFile;
use lofty::ogg::{OggPictureStorage, VorbisComments};
use lofty::picture::{PictureInformation, PictureType};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Seek;
use std::path::{Path, PathBuf};

use super::cover::{describe_picture, CoverArt};
use super::error::TagError;
use super::mapping::TagMappings;
use super::value::{TagValue, TagWriteOptions};
use super::{id3, mp4, vorbis};

const SUPPORTED_EXTENSIONS: &str = ".flac, .mp3, .aif, .aiff, .mp4, .m4a, .wav, .aac";

/// Container families with distinct tag storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFamily {
    /// Vorbis comments plus FLAC picture blocks.
    Flac,
    /// ID3v2 in an MPEG stream.
    Mpeg,
    /// ID3v2 chunk in an IFF container.
    Aiff,
    /// `ilst` atoms.
    Mp4,
    /// ID3v2 chunk in RIFF; no artwork.
    Wav,
    /// ID3v2 ahead of an ADTS stream.
    Aac,
}

impl ContainerFamily {
    pub fn from_path(path: &Path) -> Result<Self, TagError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "flac" => Ok(Self::Flac),
            "mp3" => Ok(Self::Mpeg),
            "aif" | "aiff" => Ok(Self::Aiff),
            "mp4" | "m4a" => Ok(Self::Mp4),
            "wav" => Ok(Self::Wav),
            "aac" => Ok(Self::Aac),
            _ => Err(TagError::audio_format(format!(
                "Unsupported audio format: '.{}'. Supported formats: {}",
                extension, SUPPORTED_EXTENSIONS
            ))),
        }
    }

    /// Whether the container can hold cover art.
    pub fn supports_artwork(&self) -> bool {
        !matches!(self, Self::Wav)
    }
}

impl fmt::Display for ContainerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Flac => "FLAC",
            Self::Mpeg => "MP3",
            Self::Aiff => "AIFF",
            Self::Mp4 => "MP4",
            Self::Wav => "WAV",
            Self::Aac => "AAC",
        };
        f.write_str(name)
    }
}

enum Container {
    Flac(FlacFile),
    Mpeg(MpegFile),
    Aiff(AiffFile),
    Mp4(Mp4File),
    Wav(WavFile),
    Aac(AacFile),
}

/// Native tag of the open container, created empty when absent.
enum NativeTag<'a> {
    Vorbis(&'a mut VorbisComments),
    Id3(&'a mut Id3v2Tag),
    Ilst(&'a mut Ilst),
}

/// An audio file opened for tag editing.
///
/// Edits stay in memory until [`AudioHandle::save`].
pub struct AudioHandle {
    path: PathBuf,
    family: ContainerFamily,
    container: Container,
}

impl AudioHandle {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TagError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TagError::file_not_found(path));
        }
        let family = ContainerFamily::from_path(path)?;

        let mut file = File::open(path)?;
        let options = ParseOptions::new().read_properties(false);
        let unreadable = |e: LoftyError| {
            TagError::audio_format(format!(
                "Could not read {} file {}: {}",
                family,
                path.display(),
                e
            ))
        };

        let container = match family {
            ContainerFamily::Flac => {
                Container::Flac(FlacFile::read_from(&mut file, options).map_err(unreadable)?)
            }
            ContainerFamily::Mpeg => {
                Container::Mpeg(MpegFile::read_from(&mut file, options).map_err(unreadable)?)
            }
            ContainerFamily::Aiff => {
                Container::Aiff(AiffFile::read_from(&mut file, options).map_err(unreadable)?)
            }
            ContainerFamily::Mp4 => {
                Container::Mp4(Mp4File::read_from(&mut file, options).map_err(unreadable)?)
            }
            ContainerFamily::Wav => {
                Container::Wav(WavFile::read_from(&mut file, options).map_err(unreadable)?)
            }
            ContainerFamily::Aac => {
                Container::Aac(AacFile::read_from(&mut file, options).map_err(unreadable)?)
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            family,
            container,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn family(&self) -> ContainerFamily {
        self.family
    }

    /// Writes one value under the lowercase canonical `key`.
    pub fn set(
        &mut self,
        mappings: &TagMappings,
        key: &str,
        value: &TagValue,
        options: &TagWriteOptions,
    ) -> Result<(), TagError> {
        self.with_native_tag(|tag| match tag {
            NativeTag::Vorbis(tag) => vorbis::set(tag, key, value),
            NativeTag::Id3(tag) => id3::set(tag, mappings, key, value, options),
            NativeTag::Ilst(ilst) => mp4::set(ilst, mappings, key, value),
        })
    }

    /// Embeds the image at `cover_path` as the front cover.
    ///
    /// Returns `false` without touching the image when the container has no
    /// artwork support.
    pub fn set_cover(
        &mut self,
        cover_path: &Path,
        options: &TagWriteOptions,
    ) -> Result<bool, TagError> {
        if !self.family.supports_artwork() {
            return Ok(false);
        }
        let cover = CoverArt::load(cover_path)?;

        if let Container::Flac(file) = &mut self.container {
            file.remove_picture_type(PictureType::CoverFront);
            file.insert_picture(cover.into_picture(None), Some(PictureInformation::default()))
                .map_err(|e| TagError::metadata(format!("Could not add cover art: {}", e)))?;
            return Ok(true);
        }

        // AAC covers carry no description.
        let description = (self.family != ContainerFamily::Aac).then_some("Cover");
        self.with_native_tag(|tag| match tag {
            NativeTag::Id3(tag) => id3::set_cover(tag, cover, description, options),
            NativeTag::Ilst(ilst) => mp4::set_cover(ilst, cover),
            NativeTag::Vorbis(_) => {}
        });
        Ok(true)
    }

    /// Strips all embedded artwork; returns whether any was present.
    pub fn remove_cover(&mut self) -> bool {
        let mut removed = false;
        if let Container::Flac(file) = &mut self.container {
            removed = !file.pictures().is_empty();
            while !file.pictures().is_empty() {
                file.remove_picture(file.pictures().len() - 1);
            }
        }
        let removed_native = self.with_native_tag(|tag| match tag {
            NativeTag::Vorbis(tag) => vorbis::remove_pictures(tag),
            NativeTag::Id3(tag) => id3::remove_pictures(tag),
            NativeTag::Ilst(ilst) => mp4::remove_cover(ilst),
        });
        removed || removed_native
    }

    /// Best-effort removal; returns whether anything was deleted.
    pub fn remove(&mut self, mappings: &TagMappings, key: &str) -> bool {
        self.with_native_tag(|tag| match tag {
            NativeTag::Vorbis(tag) => vorbis::remove(tag, key),
            NativeTag::Id3(tag) => id3::remove(tag, mappings, key),
            NativeTag::Ilst(ilst) => mp4::remove(ilst, mappings, key),
        })
    }

    /// Writes the in-memory tags back to the file.
    pub fn save(&self) -> Result<(), TagError> {
        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        file.rewind()?;
        let options = WriteOptions::default();
        let result = match &self.container {
            Container::Flac(f) => f.save_to(&mut file, options),
            Container::Mpeg(f) => f.save_to(&mut file, options),
            Container::Aiff(f) => f.save_to(&mut file, options),
            Container::Mp4(f) => f.save_to(&mut file, options),
            Container::Wav(f) => f.save_to(&mut file, options),
            Container::Aac(f) => f.save_to(&mut file, options),
        };
        result.map_err(|e| {
            TagError::metadata(format!(
                "Failed to save tags to {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Native keys and rendered values of the current in-memory tags.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        match &self.container {
            Container::Flac(f) => {
                if let Some(tag) = f.vorbis_comments() {
                    vorbis::snapshot(tag, &mut out);
                }
                for (i, (picture, _)) in f.pictures().iter().enumerate() {
                    out.insert(format!("picture:{}", i), describe_picture(picture));
                }
            }
            Container::Mpeg(f) => id3_snapshot(f.id3v2(), &mut out),
            Container::Aiff(f) => id3_snapshot(f.id3v2(), &mut out),
            Container::Wav(f) => id3_snapshot(f.id3v2(), &mut out),
            Container::Aac(f) => id3_snapshot(f.id3v2(), &mut out),
            Container::Mp4(f) => {
                if let Some(ilst) = f.ilst() {
                    mp4::snapshot(ilst, &mut out);
                }
            }
        }
        out
    }

    /// Runs `op` on the native tag, creating an empty one when absent.
    fn with_native_tag<R>(&mut self, op: impl FnOnce(NativeTag<'_>) -> R) -> R {
        match &mut self.container {
            Container::Flac(f) => {
                let mut tag = f.vorbis_comments_mut().map(std::mem::take).unwrap_or_default();
                let result = op(NativeTag::Vorbis(&mut tag));
                f.set_vorbis_comments(tag);
                result
            }
            Container::Mp4(f) => {
                let mut ilst = f.ilst_mut().map(std::mem::take).unwrap_or_default();
                let result = op(NativeTag::Ilst(&mut ilst));
                f.set_ilst(ilst);
                result
            }
            Container::Mpeg(f) => {
                let mut tag = f.id3v2_mut().map(std::mem::take).unwrap_or_default();
                let result = op(NativeTag::Id3(&mut tag));
                f.set_id3v2(tag);
                result
            }
            Container::Aiff(f) => {
                let mut tag = f.id3v2_mut().map(std::mem::take).unwrap_or_default();
                let result = op(NativeTag::Id3(&mut tag));
                f.set_id3v2(tag);
                result
            }
            Container::Wav(f) => {
                let mut tag = f.id3v2_mut().map(std::mem::take).unwrap_or_default();
                let result = op(NativeTag::Id3(&mut tag));
                f.set_id3v2(tag);
                result
            }
            Container::Aac(f) => {
                let mut tag = f.id3v2_mut().map(std::mem::take).unwrap_or_default();
                let result = op(NativeTag::Id3(&mut tag));
                f.set_id3v2(tag);
                result
            }
        }
    }
}

fn id3_snapshot(tag: Option<&Id3v2Tag>, out: &mut BTreeMap<String, String>) {
    if let Some(tag) = tag {
        id3::snapshot(tag, out);
    }
}
