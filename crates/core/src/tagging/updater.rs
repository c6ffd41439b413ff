use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::TagError;
use super::handle::{AudioHandle, ContainerFamily};
use super::mapping::TagMappings;
use super::value::{TagValue, TagWriteOptions};

/// Canonical key whose value is an image path rather than text.
pub const COVER_ART_KEY: &str = "cover_art";

#[derive(Debug, Deserialize)]
struct TagRecord {
    tag_key: String,
    value: serde_json::Value,
}

/// Applies canonical metadata to one audio file.
///
/// Every successful update is saved immediately, so a failing pair in a
/// bulk update leaves the earlier pairs written.
pub struct MetaUpdater {
    handle: AudioHandle,
    mappings: Arc<TagMappings>,
}

impl MetaUpdater {
    pub fn open(path: impl AsRef<Path>, mappings: Arc<TagMappings>) -> Result<Self, TagError> {
        let handle = AudioHandle::open(path)?;
        debug!(
            path = %handle.path().display(),
            format = %handle.family(),
            "Opened audio file for tagging"
        );
        Ok(Self { handle, mappings })
    }

    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    pub fn family(&self) -> ContainerFamily {
        self.handle.family()
    }

    /// Sets, replaces or deletes one tag and saves the file.
    ///
    /// A blank value deletes the tag; deleting an absent tag is not an error.
    pub fn update_or_add_metadata(
        &mut self,
        key: &str,
        value: TagValue,
        options: &TagWriteOptions,
    ) -> Result<(), TagError> {
        if key.is_empty() {
            return Err(TagError::value("Tag key must be a non-empty string"));
        }
        let key = key.to_lowercase();
        let value = value.trimmed();

        if key == COVER_ART_KEY {
            return self.update_cover(&value, options);
        }

        if value.is_blank() {
            self.delete(&key);
            return Ok(());
        }

        self.handle.set(&self.mappings, &key, &value, options)?;
        self.handle.save()?;
        info!(
            path = %self.handle.path().display(),
            tag = %key,
            value = %value,
            "Updated tag"
        );
        Ok(())
    }

    /// Applies pairs in order.
    pub fn update_metadata_list(
        &mut self,
        pairs: &[(String, TagValue)],
        options: &TagWriteOptions,
    ) -> Result<(), TagError> {
        if pairs.is_empty() {
            return Err(TagError::value("Metadata list must not be empty"));
        }
        for (key, value) in pairs {
            self.update_or_add_metadata(key, value.clone(), options)?;
        }
        Ok(())
    }

    /// Applies a JSON list of `{"tag_key": ..., "value": ...}` records.
    pub fn update_metadata_from_json(
        &mut self,
        path: impl AsRef<Path>,
        options: &TagWriteOptions,
    ) -> Result<(), TagError> {
        let pairs = read_tag_records(path.as_ref())?;
        self.update_metadata_list(&pairs, options)
    }

    /// Native keys and rendered values currently held by the file.
    pub fn current_tags(&self) -> BTreeMap<String, String> {
        self.handle.snapshot()
    }

    fn update_cover(&mut self, value: &TagValue, options: &TagWriteOptions) -> Result<(), TagError> {
        let source = match &options.cover_path {
            Some(path) => path.clone(),
            None if value.is_blank() => {
                self.delete(COVER_ART_KEY);
                return Ok(());
            }
            None => PathBuf::from(value.as_text().ok_or_else(|| {
                TagError::value("Cover art value must be an image path")
            })?),
        };

        if !self.handle.set_cover(&source, options)? {
            debug!(
                path = %self.handle.path().display(),
                format = %self.handle.family(),
                "Container has no artwork support, skipping cover art"
            );
            return Ok(());
        }
        self.handle.save()?;
        info!(
            path = %self.handle.path().display(),
            cover = %source.display(),
            "Embedded cover art"
        );
        Ok(())
    }

    /// Deleting cover art strips every embedded picture.
    fn delete(&mut self, key: &str) {
        let removed = if key == COVER_ART_KEY {
            self.handle.remove_cover()
        } else {
            self.handle.remove(&self.mappings, key)
        };
        if !removed {
            debug!(tag = %key, "Tag not present, nothing to delete");
            return;
        }
        match self.handle.save() {
            Ok(()) => info!(path = %self.handle.path().display(), tag = %key, "Deleted tag"),
            Err(e) => warn!(tag = %key, error = %e, "Failed to delete tag"),
        }
    }
}

/// Reads `{tag_key, value}` records into ordered pairs.
pub fn read_tag_records(path: &Path) -> Result<Vec<(String, TagValue)>, TagError> {
    if !path.is_file() {
        return Err(TagError::file_not_found(path));
    }
    let content = std::fs::read_to_string(path)?;
    let data: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| TagError::value(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    let serde_json::Value::Array(records) = data else {
        return Err(TagError::value("JSON must contain a list of tag records"));
    };

    records
        .into_iter()
        .map(|record| {
            let record: TagRecord = serde_json::from_value(record).map_err(|_| {
                TagError::value("Each record must have 'tag_key' and 'value' fields")
            })?;
            Ok((record.tag_key, TagValue::try_from(record.value)?))
        })
        .collect()
}
