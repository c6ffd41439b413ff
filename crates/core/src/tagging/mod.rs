//! Metadata tagging across audio containers.
//!
//! Canonical keys such as `title` or `discnumber` are translated to the
//! native storage of each container family: Vorbis comments for FLAC, ID3v2
//! frames for MP3, AIFF, WAV and AAC, and `ilst` atoms for MP4. The frame and
//! atom names come from a [`TagMappings`] file; keys without a mapping are
//! still written, to a described lyrics frame or an iTunes free-form atom.
//!
//! [`MetaUpdater`] is the entry point:
//!
//! ```ignore
//! let mappings = Arc::new(TagMappings::load("config/tag_mappings.json")?);
//! let mut updater = MetaUpdater::open("song.mp3", mappings)?;
//! updater.update_or_add_metadata("title", "Song".into(), &TagWriteOptions::default())?;
//! println!("{:?}", updater.current_tags());
//! ```

mod cover;
mod error;
mod handle;
mod id3;
mod mapping;
mod mp4;
mod updater;
mod value;
mod vorbis;

pub use cover::CoverArt;
pub use error::TagError;
pub use handle::{AudioHandle, ContainerFamily};
pub use mapping::{AtomKey, AtomMapping, FrameKind, Id3Mapping, TagMappings};
pub use updater::{read_tag_records, MetaUpdater, COVER_ART_KEY};
pub use value::{FrameEncoding, Language, TagValue, TagWriteOptions};
