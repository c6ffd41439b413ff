//! Tag round trips through every container family.
//!
//! Each test writes canonical keys and a cover image with the shipped
//! mappings, reopens the file from disk, then deletes through blank values:
//! - FLAC: Vorbis comments plus PICTURE blocks
//! - M4A: `ilst` atoms including `trkn`, `disk` and `covr`
//! - AAC and AIFF: ID3v2 frames, the AAC cover without a description

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use media_encoder_core::{
    tagging::{ContainerFamily, COVER_ART_KEY},
    testing::fixtures,
    MetaUpdater, TagError, TagMappings, TagValue, TagWriteOptions,
};

fn mappings() -> Arc<TagMappings> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/tag_mappings.json");
    Arc::new(TagMappings::load(path).expect("Failed to load tag mappings"))
}

struct Scratch {
    dir: TempDir,
}

impl Scratch {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn file(&self, name: &str, bytes: Vec<u8>) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes).expect("Failed to write fixture");
        path
    }

    fn png(&self, len: usize) -> PathBuf {
        self.file("front.png", vec![0x89; len])
    }
}

fn apply(path: &Path, pairs: &[(&str, &str)]) {
    let pairs: Vec<(String, TagValue)> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), TagValue::from(*v)))
        .collect();
    let mut updater = MetaUpdater::open(path, mappings()).unwrap();
    updater
        .update_metadata_list(&pairs, &TagWriteOptions::default())
        .unwrap();
}

fn read(path: &Path) -> BTreeMap<String, String> {
    MetaUpdater::open(path, mappings()).unwrap().current_tags()
}

fn value<'a>(tags: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str)
}

#[test]
fn test_flac_round_trip() {
    let scratch = Scratch::new();
    let path = scratch.file("song.flac", fixtures::flac_bytes());
    let cover = scratch.png(40).to_string_lossy().into_owned();

    apply(
        &path,
        &[
            ("Title", "Song"),
            ("artist", "Band"),
            ("tracknumber", "3/12"),
            (COVER_ART_KEY, cover.as_str()),
        ],
    );
    // A second cover replaces the first front cover.
    apply(&path, &[(COVER_ART_KEY, cover.as_str())]);

    let tags = read(&path);
    assert_eq!(value(&tags, "title"), Some("Song"));
    assert_eq!(value(&tags, "artist"), Some("Band"));
    assert_eq!(value(&tags, "tracknumber"), Some("3/12"));
    assert_eq!(value(&tags, "picture:0"), Some("<image/png, 40 bytes>"));
    assert!(!tags.contains_key("picture:1"));

    apply(&path, &[("title", ""), (COVER_ART_KEY, "")]);

    let tags = read(&path);
    assert!(!tags.contains_key("title"));
    assert!(tags.keys().all(|k| !k.starts_with("picture")));
    assert_eq!(value(&tags, "artist"), Some("Band"));
}

#[test]
fn test_flac_rejects_invalid_comment_key() {
    let scratch = Scratch::new();
    let path = scratch.file("song.flac", fixtures::flac_bytes());

    let mut updater = MetaUpdater::open(&path, mappings()).unwrap();
    let err = updater
        .update_or_add_metadata("mood=calm", TagValue::from("x"), &TagWriteOptions::default())
        .unwrap_err();

    assert!(matches!(err, TagError::Metadata { .. }));
    assert!(read(&path).is_empty());
}

#[test]
fn test_m4a_round_trip() {
    let scratch = Scratch::new();
    let path = scratch.file("song.m4a", fixtures::m4a_bytes());
    let cover = scratch
        .file("front.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0])
        .to_string_lossy()
        .into_owned();

    apply(
        &path,
        &[
            ("title", "Song"),
            ("tracknumber", "3/12"),
            ("discnumber", "1/2"),
            ("isrc", "USRC17607839"),
            ("mood", "Calm"),
            (COVER_ART_KEY, cover.as_str()),
        ],
    );

    let updater = MetaUpdater::open(&path, mappings()).unwrap();
    assert_eq!(updater.family(), ContainerFamily::Mp4);
    let tags = updater.current_tags();
    assert_eq!(value(&tags, "\u{a9}nam"), Some("Song"));
    assert_eq!(value(&tags, "trkn"), Some("3/12"));
    assert_eq!(value(&tags, "disk"), Some("1/2"));
    assert_eq!(
        value(&tags, "----:com.apple.iTunes:ISRC"),
        Some("USRC17607839")
    );
    assert_eq!(value(&tags, "----:com.apple.iTunes:mood"), Some("Calm"));
    assert_eq!(value(&tags, "covr"), Some("<image/jpeg, 8 bytes>"));

    apply(&path, &[("tracknumber", ""), ("mood", ""), (COVER_ART_KEY, "")]);

    let tags = read(&path);
    assert!(!tags.contains_key("trkn"));
    assert!(!tags.contains_key("----:com.apple.iTunes:mood"));
    assert!(!tags.contains_key("covr"));
    assert_eq!(value(&tags, "disk"), Some("1/2"));
}

#[test]
fn test_aac_round_trip() {
    let scratch = Scratch::new();
    let path = scratch.file("song.aac", fixtures::aac_bytes(6));
    let cover = scratch.png(24).to_string_lossy().into_owned();

    apply(
        &path,
        &[
            ("title", "Song"),
            ("tracknumber", "3/12"),
            (COVER_ART_KEY, cover.as_str()),
        ],
    );

    let tags = read(&path);
    assert_eq!(value(&tags, "TIT2"), Some("Song"));
    assert_eq!(value(&tags, "TRCK"), Some("3/12"));
    assert_eq!(value(&tags, "APIC"), Some("<image/png, 24 bytes>"));
    assert!(!tags.contains_key("APIC:Cover"));

    apply(&path, &[(COVER_ART_KEY, "")]);

    let tags = read(&path);
    assert!(tags.keys().all(|k| !k.starts_with("APIC")));
    assert_eq!(value(&tags, "TIT2"), Some("Song"));
}

#[test]
fn test_aiff_round_trip() {
    let scratch = Scratch::new();
    let path = scratch.file("song.aiff", fixtures::aiff_bytes(2_000));
    let cover = scratch.png(16).to_string_lossy().into_owned();

    apply(
        &path,
        &[
            ("artist", "Band"),
            ("lyrics", "La la"),
            (COVER_ART_KEY, cover.as_str()),
        ],
    );

    let tags = read(&path);
    assert_eq!(value(&tags, "TPE1"), Some("Band"));
    assert_eq!(value(&tags, "USLT::eng"), Some("La la"));
    assert_eq!(value(&tags, "APIC:Cover"), Some("<image/png, 16 bytes>"));

    apply(&path, &[("artist", ""), (COVER_ART_KEY, "")]);

    let tags = read(&path);
    assert!(!tags.contains_key("TPE1"));
    assert!(!tags.contains_key("APIC:Cover"));
    assert_eq!(value(&tags, "USLT::eng"), Some("La la"));
}
