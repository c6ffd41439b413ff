//! ID3v2 frame writes shared by the MPEG, AIFF, WAV and AAC families.

use lofty::id3::v2::{
    AttachedPictureFrame, CommentFrame, Frame, FrameId, Id3v2Tag, TextInformationFrame,
    UnsynchronizedTextFrame,
};
use lofty::tag::TagExt as _;
use std::borrow::Cow;
use std::collections::BTreeMap;

use super::cover::{describe_picture, CoverArt};
use super::error::TagError;
use super::mapping::{FrameKind, TagMappings};
use super::value::{TagValue, TagWriteOptions};

/// Writes `value` to the frame mapped for `key`.
///
/// Keys without a mapping are stored in a `USLT` frame whose description is
/// the key itself.
pub(crate) fn set(
    tag: &mut Id3v2Tag,
    mappings: &TagMappings,
    key: &str,
    value: &TagValue,
    options: &TagWriteOptions,
) -> Result<(), TagError> {
    let text = value.as_text().ok_or_else(|| {
        TagError::value(format!(
            "Invalid value type: {}. Frame-based tags take a single value.",
            value.type_name()
        ))
    })?;
    let encoding = options.encoding.text_encoding();
    let language = options.language.bytes();

    let frame = match mappings.id3(key).map(|m| &m.frame) {
        Some(FrameKind::Text(id)) => {
            tag.retain(|f| f.id().as_str() != id.as_str());
            Frame::Text(TextInformationFrame::new(
                FrameId::Valid(Cow::Owned(id.clone())),
                encoding,
                text,
            ))
        }
        Some(FrameKind::Lyrics) => {
            tag.retain(|f| !is_described(f, "USLT", "", Some(language)));
            Frame::UnsynchronizedText(UnsynchronizedTextFrame::new(
                encoding,
                language,
                String::new(),
                text,
            ))
        }
        Some(FrameKind::Comment) => {
            tag.retain(|f| !is_described(f, "COMM", "", Some(language)));
            Frame::Comment(CommentFrame::new(encoding, language, String::new(), text))
        }
        None => {
            tag.retain(|f| !is_described(f, "USLT", key, None));
            Frame::UnsynchronizedText(UnsynchronizedTextFrame::new(
                encoding,
                language,
                key.to_string(),
                text,
            ))
        }
    };

    tag.insert(frame);
    Ok(())
}

/// Replaces the front cover picture carrying the same description.
pub(crate) fn set_cover(
    tag: &mut Id3v2Tag,
    cover: CoverArt,
    description: Option<&str>,
    options: &TagWriteOptions,
) {
    let wanted = description.unwrap_or_default();
    tag.retain(|f| match f {
        Frame::Picture(apic) => apic.picture.description().unwrap_or_default() != wanted,
        _ => true,
    });
    tag.insert(Frame::Picture(AttachedPictureFrame::new(
        options.encoding.text_encoding(),
        cover.into_picture(description),
    )));
}

/// Drops every attached picture, whatever its type or description.
pub(crate) fn remove_pictures(tag: &mut Id3v2Tag) -> bool {
    let before = tag.len();
    tag.retain(|f| !matches!(f, Frame::Picture(_)));
    tag.len() != before
}

/// Deletes the mapped frame, a frame named by the raw key, and any
/// described frame whose description is the key. Returns whether anything
/// was removed.
pub(crate) fn remove(tag: &mut Id3v2Tag, mappings: &TagMappings, key: &str) -> bool {
    let raw_id = key.to_uppercase();
    let mapped = mappings.id3(key).map(|m| m.frame.clone());
    let before = tag.len();

    tag.retain(|f| {
        let id = f.id().as_str();
        let mapped_hit = match &mapped {
            Some(FrameKind::Text(mapped_id)) => id == mapped_id,
            Some(kind) => is_described(f, kind.id(), "", None),
            None => false,
        };
        let described_hit = ["USLT", "COMM", "TXXX"]
            .iter()
            .any(|described| is_described(f, described, key, None));
        !(mapped_hit || described_hit || id == raw_id)
    });

    tag.len() != before
}

pub(crate) fn snapshot(tag: &Id3v2Tag, out: &mut BTreeMap<String, String>) {
    for frame in tag {
        let id = frame.id().as_str();
        let (key, value) = match frame {
            Frame::Text(f) => (id.to_string(), f.value.to_string()),
            Frame::UserText(f) => (format!("{}:{}", id, f.description), f.content.to_string()),
            Frame::Comment(f) => (
                format!("{}:{}:{}", id, f.description, language_str(&f.language)),
                f.content.to_string(),
            ),
            Frame::UnsynchronizedText(f) => (
                format!("{}:{}:{}", id, f.description, language_str(&f.language)),
                f.content.to_string(),
            ),
            Frame::Picture(f) => {
                let key = match f.picture.description() {
                    Some(desc) if !desc.is_empty() => format!("{}:{}", id, desc),
                    _ => id.to_string(),
                };
                (key, describe_picture(&f.picture))
            }
            Frame::Timestamp(f) => (id.to_string(), f.timestamp.to_string()),
            _ => (id.to_string(), "<binary>".to_string()),
        };
        out.entry(key)
            .and_modify(|joined: &mut String| {
                joined.push_str("; ");
                joined.push_str(&value);
            })
            .or_insert(value);
    }
}

/// Matches a language/description frame of type `id`. `language` of `None`
/// matches any language.
fn is_described(
    frame: &Frame<'_>,
    id: &str,
    description: &str,
    language: Option<[u8; 3]>,
) -> bool {
    let (desc, lang): (&str, [u8; 3]) = match frame {
        Frame::UnsynchronizedText(f) if id == "USLT" => (&f.description, f.language),
        Frame::Comment(f) if id == "COMM" => (&f.description, f.language),
        Frame::UserText(f) if id == "TXXX" => return f.description == description,
        _ => return false,
    };
    desc == description && language.map_or(true, |l| l == lang)
}

fn language_str(language: &[u8; 3]) -> Cow<'_, str> {
    String::from_utf8_lossy(language)
}
