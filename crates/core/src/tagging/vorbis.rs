//! Vorbis comment writes for the FLAC family.

use lofty::ogg::{OggPictureStorage, VorbisComments};
use std::collections::BTreeMap;

use super::error::TagError;
use super::value::TagValue;

/// Comment field names are printable ASCII without `=`.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| (0x20..=0x7D).contains(&b) && b != b'=')
}

/// Replaces every comment named `key` with the value's items.
pub(crate) fn set(
    tag: &mut VorbisComments,
    key: &str,
    value: &TagValue,
) -> Result<(), TagError> {
    if !is_valid_key(key) {
        return Err(TagError::metadata(format!(
            "Invalid Vorbis comment key: {:?}",
            key
        )));
    }
    tag.remove(key).for_each(drop);
    for item in value.items() {
        tag.push(key.to_string(), item);
    }
    Ok(())
}

/// Drops every embedded picture block, returning whether any existed.
pub(crate) fn remove_pictures(tag: &mut VorbisComments) -> bool {
    let had_pictures = !tag.pictures().is_empty();
    while !tag.pictures().is_empty() {
        tag.remove_picture(tag.pictures().len() - 1);
    }
    had_pictures
}

/// Returns whether any comment was removed.
pub(crate) fn remove(tag: &mut VorbisComments, key: &str) -> bool {
    tag.remove(key).count() > 0
}

pub(crate) fn snapshot(tag: &VorbisComments, out: &mut BTreeMap<String, String>) {
    for (key, value) in tag.items() {
        out.entry(key.to_lowercase())
            .and_modify(|joined: &mut String| {
                joined.push_str("; ");
                joined.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
}
