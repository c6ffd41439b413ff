//! Tag values and write options.

use lofty::TextEncoding;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

use super::error::TagError;

/// A metadata value before it is written to a container.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Text(String),
    /// Multi-valued field; only some containers accept these.
    List(Vec<String>),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl TagValue {
    /// Whether the value requests deletion of the tag.
    ///
    /// Blank text and lists made only of blank items count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.iter().all(|s| s.trim().is_empty()),
            _ => false,
        }
    }

    /// Trims text values; other variants are returned unchanged.
    pub fn trimmed(self) -> Self {
        match self {
            Self::Text(s) => Self::Text(s.trim().to_string()),
            other => other,
        }
    }

    /// Scalar values as stored text, `None` for lists.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::List(_) => None,
        }
    }

    /// All values as stored text; scalars yield one item.
    pub fn items(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.clone(),
            scalar => scalar.as_text().into_iter().collect(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "string",
            Self::List(_) => "list",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.items().join("; "))
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for TagValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for TagValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for TagValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Vec<String>> for TagValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_type(value: &Value) -> TagError {
    TagError::value(format!(
        "Invalid value type: {}. Must be string, list, boolean, integer, or float.",
        json_kind(value)
    ))
}

fn scalar_from_json(value: Value) -> Result<TagValue, TagError> {
    match value {
        Value::String(s) => Ok(TagValue::Text(s)),
        Value::Bool(b) => Ok(TagValue::Bool(b)),
        Value::Number(ref n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(TagValue::Int(i)),
            (None, Some(f)) => Ok(TagValue::Float(f)),
            _ => Err(invalid_type(&value)),
        },
        other => Err(invalid_type(&other)),
    }
}

impl TryFrom<Value> for TagValue {
    type Error = TagError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| {
                    scalar_from_json(item)?
                        .as_text()
                        .ok_or_else(|| TagError::value("Invalid value type: nested list"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(TagValue::List),
            other => scalar_from_json(other),
        }
    }
}

/// Text encoding used for frame-based tags, numbered 1 to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEncoding(u8);

impl FrameEncoding {
    pub fn new(code: u8) -> Result<Self, TagError> {
        if (1..=4).contains(&code) {
            Ok(Self(code))
        } else {
            Err(TagError::value("Encoding must be an integer between 1 and 4"))
        }
    }

    pub fn code(&self) -> u8 {
        self.0
    }

    pub(crate) fn text_encoding(&self) -> TextEncoding {
        match self.0 {
            1 => TextEncoding::UTF16,
            2 => TextEncoding::UTF16BE,
            _ => TextEncoding::UTF8,
        }
    }
}

impl Default for FrameEncoding {
    fn default() -> Self {
        Self(3)
    }
}

/// Three-letter lowercase ISO 639-2 language code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language([u8; 3]);

impl Language {
    pub fn parse(code: &str) -> Result<Self, TagError> {
        let invalid = || TagError::value("Language code must be a 3-letter ISO 639-2 code");
        let bytes: [u8; 3] = code.as_bytes().try_into().map_err(|_| invalid())?;
        if !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(invalid());
        }
        Ok(Self(bytes.map(|b| b.to_ascii_lowercase())))
    }

    pub fn bytes(&self) -> [u8; 3] {
        self.0
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("eng")
    }
}

impl Default for Language {
    fn default() -> Self {
        Self(*b"eng")
    }
}

/// Options shared by all writes of one update call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagWriteOptions {
    pub encoding: FrameEncoding,
    pub language: Language,
    /// Cover image; takes precedence over the `cover_art` value.
    pub cover_path: Option<PathBuf>,
}

impl TagWriteOptions {
    /// Validates raw encoding and language parameters.
    pub fn new(encoding: u8, language: &str) -> Result<Self, TagError> {
        Ok(Self {
            encoding: FrameEncoding::new(encoding)?,
            language: Language::parse(language)?,
            cover_path: None,
        })
    }

    pub fn with_cover_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cover_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_values() {
        assert!(TagValue::from("").is_blank());
        assert!(TagValue::from("   ").is_blank());
        assert!(TagValue::List(vec![" ".into(), String::new()]).is_blank());
        assert!(!TagValue::from("x").is_blank());
        assert!(!TagValue::Int(0).is_blank());
        assert!(!TagValue::Bool(false).is_blank());
    }

    #[test]
    fn test_scalars_are_stringified() {
        assert_eq!(TagValue::Int(3).as_text().as_deref(), Some("3"));
        assert_eq!(TagValue::Bool(true).as_text().as_deref(), Some("true"));
        assert_eq!(TagValue::Float(1.5).as_text().as_deref(), Some("1.5"));
        assert_eq!(TagValue::List(vec!["a".into()]).as_text(), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(TagValue::try_from(json!("Song")).unwrap(), TagValue::from("Song"));
        assert_eq!(TagValue::try_from(json!(7)).unwrap(), TagValue::Int(7));
        assert_eq!(TagValue::try_from(json!(0.5)).unwrap(), TagValue::Float(0.5));
        assert_eq!(TagValue::try_from(json!(false)).unwrap(), TagValue::Bool(false));
        assert_eq!(
            TagValue::try_from(json!(["Rock", 1990])).unwrap(),
            TagValue::List(vec!["Rock".into(), "1990".into()])
        );
    }

    #[test]
    fn test_from_json_rejects_other_shapes() {
        for value in [json!(null), json!({"a": 1}), json!([[1]]), json!([{"a": 1}])] {
            let err = TagValue::try_from(value).unwrap_err();
            assert!(err.to_string().starts_with("Invalid value type"), "{}", err);
        }
    }

    #[test]
    fn test_encoding_range() {
        assert!(FrameEncoding::new(0).is_err());
        assert!(FrameEncoding::new(5).is_err());
        assert_eq!(FrameEncoding::new(1).unwrap().text_encoding(), TextEncoding::UTF16);
        assert_eq!(FrameEncoding::default().text_encoding(), TextEncoding::UTF8);
    }

    #[test]
    fn test_language_normalized() {
        assert_eq!(Language::parse("ENG").unwrap().as_str(), "eng");
        assert_eq!(Language::parse("deu").unwrap().bytes(), *b"deu");
        assert!(Language::parse("en").is_err());
        assert!(Language::parse("e1g").is_err());
        assert!(Language::parse("engl").is_err());
    }

    #[test]
    fn test_options_validate() {
        assert!(TagWriteOptions::new(3, "eng").is_ok());
        assert!(matches!(
            TagWriteOptions::new(9, "eng"),
            Err(TagError::Value { .. })
        ));
    }
}
