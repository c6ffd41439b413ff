//! Insertion-ordered argument map.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::profile::CatalogError;

/// Ordered key/value argument set.
///
/// Keys keep the position of their first insertion; re-inserting a key replaces
/// its value in place. This gives the "later layer wins, first-seen order" merge
/// used when composing engine arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgMap {
    entries: Vec<(String, String)>,
}

impl ArgMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pair, returning the previous value when the key was present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Merges another layer on top of this one.
    pub fn merge(&mut self, layer: &ArgMap) {
        for (key, value) in layer.iter() {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a `"k1=v1,k2=v2"` string.
    ///
    /// Each comma separated segment must contain exactly one `=`; keys and values
    /// are trimmed. An empty string yields an empty map.
    pub fn parse(encoded: &str) -> Result<Self, CatalogError> {
        let mut map = Self::new();
        if encoded.trim().is_empty() {
            return Ok(map);
        }
        for segment in encoded.split(',') {
            let (key, value) = split_segment(segment)?;
            map.insert(key.trim(), value.trim());
        }
        Ok(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ArgMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Parses user supplied `key=value` lists such as `title='Song', artist=Band`.
///
/// Like [`ArgMap::parse`] but also strips surrounding single or double quotes
/// from keys and values.
pub fn parse_key_value_list(input: &str) -> Result<ArgMap, CatalogError> {
    let mut map = ArgMap::new();
    if input.trim().is_empty() {
        return Ok(map);
    }
    for segment in input.split(',') {
        let (key, value) = split_segment(segment)?;
        map.insert(unquote(key), unquote(value));
    }
    Ok(map)
}

fn split_segment(segment: &str) -> Result<(&str, &str), CatalogError> {
    let mut parts = segment.split('=');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) if !key.trim().is_empty() => Ok((key, value)),
        _ => Err(CatalogError::Format {
            segment: segment.trim().to_string(),
        }),
    }
}

fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '\'' || c == '"')
}

impl Serialize for ArgMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for ArgMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ArgMapVisitor;

        impl<'de> Visitor<'de> for ArgMapVisitor {
            type Value = ArgMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of argument names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ArgMap, A::Error> {
                let mut map = ArgMap::new();
                while let Some((key, value)) = access.next_entry::<String, ScalarArg>()? {
                    map.insert(key, value.0);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ArgMapVisitor)
    }
}

/// Argument value that may be written as a JSON string, number, bool or null.
struct ScalarArg(String);

impl<'de> Deserialize<'de> for ScalarArg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde_json::Value;

        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Self(String::new())),
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            Value::Bool(b) => Ok(Self(b.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "argument values must be scalars, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_seen_position() {
        let mut map = ArgMap::new();
        map.insert("c", "flac");
        map.insert("ar", "44100");
        let previous = map.insert("c", "copy");

        assert_eq!(previous.as_deref(), Some("flac"));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["c", "ar"]);
        assert_eq!(map.get("c"), Some("copy"));
    }

    #[test]
    fn test_parse_encoded_setup() {
        let map = ArgMap::parse("k1=v1,k2=v2").unwrap();
        assert_eq!(map.get("k1"), Some("v1"));
        assert_eq!(map.get("k2"), Some("v2"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let map = ArgMap::parse(" c = libmp3lame , b=320k ").unwrap();
        assert_eq!(map.get("c"), Some("libmp3lame"));
        assert_eq!(map.get("b"), Some("320k"));
    }

    #[test]
    fn test_parse_rejects_segment_without_equals() {
        let err = ArgMap::parse("c=flac,bogus").unwrap_err();
        assert!(matches!(err, CatalogError::Format { ref segment } if segment == "bogus"));
    }

    #[test]
    fn test_parse_rejects_segment_with_two_equals() {
        let err = ArgMap::parse("af=volume=2").unwrap_err();
        assert!(matches!(err, CatalogError::Format { .. }));
    }

    #[test]
    fn test_parse_key_value_list_strips_quotes() {
        let map = parse_key_value_list("title='My Song', \"artist\"=\"Band\"").unwrap();
        assert_eq!(map.get("title"), Some("My Song"));
        assert_eq!(map.get("artist"), Some("Band"));
    }

    #[test]
    fn test_parse_key_value_list_empty_is_ok() {
        assert!(parse_key_value_list("   ").unwrap().is_empty());
    }

    #[test]
    fn test_deserialize_preserves_order_and_stringifies() {
        let map: ArgMap =
            serde_json::from_str(r#"{"c": "flac", "ar": 96000, "sample_fmt": "s32", "vn": null}"#)
                .unwrap();
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![("c", "flac"), ("ar", "96000"), ("sample_fmt", "s32"), ("vn", "")]
        );
    }

    #[test]
    fn test_deserialize_rejects_nested_values() {
        let result: Result<ArgMap, _> = serde_json::from_str(r#"{"c": {"nested": true}}"#);
        assert!(result.is_err());
    }
}
