//! Canonical tag key to native field mappings.
//!
//! The mapping source is a JSON object with two sections:
//!
//! ```json
//! {
//!   "mp3_tags": { "title": { "mutagen_frame": "mutagen.id3.TIT2", "description": "Title" } },
//!   "mp4_tags": { "title": { "mutagen_key": "©nam", "description": "Title" } }
//! }
//! ```
//!
//! Frame references resolve through a fixed registry of ID3v2 frame kinds;
//! nothing in the file is ever resolved dynamically.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use super::error::TagError;

/// ID3v2 text information frames accepted in mappings (v2.3 and v2.4).
const TEXT_FRAMES: &[&str] = &[
    "TALB", "TBPM", "TCMP", "TCOM", "TCON", "TCOP", "TDAT", "TDEN", "TDLY", "TDOR", "TDRC",
    "TDRL", "TDTG", "TENC", "TEXT", "TFLT", "TIME", "TIPL", "TIT1", "TIT2", "TIT3", "TKEY",
    "TLAN", "TLEN", "TMCL", "TMED", "TMOO", "TOAL", "TOFN", "TOLY", "TOPE", "TORY", "TOWN",
    "TPE1", "TPE2", "TPE3", "TPE4", "TPOS", "TPRO", "TPUB", "TRCK", "TRDA", "TRSN", "TRSO",
    "TSIZ", "TSO2", "TSOA", "TSOC", "TSOP", "TSOT", "TSRC", "TSSE", "TSST", "TYER",
];

/// Optional dotted module path followed by a frame identifier.
static FRAME_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z_][A-Za-z0-9_]*\.)*([A-Z0-9]{4})$").unwrap());

/// `----:<mean>:<name>` free-form atom key.
static FREEFORM_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^----:([^:]+):(.+)$").unwrap());

/// Native ID3v2 frame a canonical key is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// Text information frame such as `TIT2`.
    Text(String),
    /// `USLT`: language and description plus text.
    Lyrics,
    /// `COMM`: language and description plus text.
    Comment,
}

impl FrameKind {
    /// Resolves a frame reference like `mutagen.id3.TIT2` or `TIT2`.
    pub fn resolve(reference: &str) -> Option<Self> {
        let id = FRAME_REFERENCE.captures(reference.trim())?.get(1)?.as_str();
        match id {
            "USLT" => Some(Self::Lyrics),
            "COMM" => Some(Self::Comment),
            text if TEXT_FRAMES.contains(&text) => Some(Self::Text(text.to_string())),
            _ => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Text(id) => id,
            Self::Lyrics => "USLT",
            Self::Comment => "COMM",
        }
    }
}

/// Native MP4 item list key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomKey {
    Fourcc([u8; 4]),
    Freeform { mean: String, name: String },
}

impl AtomKey {
    /// Parses a native key.
    ///
    /// `©` may be written literally or as `\xa9`; any other character must be
    /// a single Latin-1 byte.
    pub fn parse(key: &str) -> Option<Self> {
        if let Some(caps) = FREEFORM_KEY.captures(key) {
            return Some(Self::Freeform {
                mean: caps[1].to_string(),
                name: caps[2].to_string(),
            });
        }

        let unescaped = key.replace("\\xa9", "\u{a9}").replace("\\xA9", "\u{a9}");
        let bytes = unescaped
            .chars()
            .map(|c| u8::try_from(u32::from(c)).ok())
            .collect::<Option<Vec<u8>>>()?;
        bytes.try_into().ok().map(Self::Fourcc)
    }

    /// Free-form key in the iTunes namespace, used for unmapped tags.
    pub fn itunes(name: &str) -> Self {
        Self::Freeform {
            mean: "com.apple.iTunes".to_string(),
            name: name.to_string(),
        }
    }

    pub fn is_freeform(&self) -> bool {
        matches!(self, Self::Freeform { .. })
    }
}

impl std::fmt::Display for AtomKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fourcc(code) => {
                let text: String = code.iter().map(|&b| char::from(b)).collect();
                f.write_str(&text)
            }
            Self::Freeform { mean, name } => write!(f, "----:{}:{}", mean, name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3Mapping {
    pub frame: FrameKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomMapping {
    pub key: AtomKey,
    pub description: String,
}

/// Loaded tag mappings for the frame-based and atom-based families.
#[derive(Debug, Clone, Default)]
pub struct TagMappings {
    id3: HashMap<String, Id3Mapping>,
    atoms: HashMap<String, AtomMapping>,
}

impl TagMappings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TagError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TagError::file_not_found(path));
        }
        let content = std::fs::read_to_string(path)?;
        let mappings = Self::from_json_str(&content)?;
        debug!(
            path = %path.display(),
            id3 = mappings.id3.len(),
            mp4 = mappings.atoms.len(),
            "Loaded tag mappings"
        );
        Ok(mappings)
    }

    pub fn from_json_str(content: &str) -> Result<Self, TagError> {
        let data: Value = serde_json::from_str(content).map_err(|e| {
            TagError::metadata(format!("Invalid JSON in tag mappings file: {}", e))
        })?;

        let (Some(mp3), Some(mp4)) = (section(&data, "mp3_tags"), section(&data, "mp4_tags")) else {
            return Err(TagError::metadata(
                "Missing required sections in tag mappings file",
            ));
        };

        let mut id3 = HashMap::with_capacity(mp3.len());
        for (tag, record) in mp3 {
            let reference = native_ref(record, "mutagen_frame")
                .ok_or_else(|| TagError::metadata(format!("Missing mutagen_frame for MP3 tag: {}", tag)))?;
            let frame = FrameKind::resolve(reference).ok_or_else(|| {
                TagError::metadata(format!(
                    "Unknown frame '{}' for MP3 tag: {}",
                    reference, tag
                ))
            })?;
            id3.insert(
                tag.to_lowercase(),
                Id3Mapping {
                    frame,
                    description: describe(record),
                },
            );
        }

        let mut atoms = HashMap::with_capacity(mp4.len());
        for (tag, record) in mp4 {
            let native = native_ref(record, "mutagen_key")
                .ok_or_else(|| TagError::metadata(format!("Missing mutagen_key for MP4 tag: {}", tag)))?;
            let key = AtomKey::parse(native).ok_or_else(|| {
                TagError::metadata(format!("Invalid atom key '{}' for MP4 tag: {}", native, tag))
            })?;
            atoms.insert(
                tag.to_lowercase(),
                AtomMapping {
                    key,
                    description: describe(record),
                },
            );
        }

        Ok(Self { id3, atoms })
    }

    /// Frame mapping for a lowercase canonical key.
    pub fn id3(&self, key: &str) -> Option<&Id3Mapping> {
        self.id3.get(key)
    }

    /// Atom mapping for a lowercase canonical key.
    pub fn atom(&self, key: &str) -> Option<&AtomMapping> {
        self.atoms.get(key)
    }

    pub fn id3_keys(&self) -> impl Iterator<Item = &str> {
        self.id3.keys().map(String::as_str)
    }

    pub fn atom_keys(&self) -> impl Iterator<Item = &str> {
        self.atoms.keys().map(String::as_str)
    }
}

fn section<'a>(data: &'a Value, name: &str) -> Option<&'a Map<String, Value>> {
    data.get(name)?.as_object()
}

fn native_ref<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
    record.get(field)?.as_str()
}

fn describe(record: &Value) -> String {
    record
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
