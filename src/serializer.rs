//! Serialization layer. Defaults to JSON via serde_json.
//!
//! Implement [`Serializer`] if you need a different on-disk encoding of the
//! same value tree.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// Converts a document tree to/from bytes for persistence.
pub trait Serializer: Send + Sync {
    /// Encode a document to bytes.
    fn serialize(&self, doc: &Value) -> Result<Vec<u8>>;

    /// Decode bytes back into a document.
    fn deserialize(&self, bytes: &[u8]) -> Result<Value>;
}

/// JSON serializer, compact or indented. Object keys come out sorted.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    indent: Option<usize>,
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented JSON, four spaces per level.
    pub fn pretty() -> Self {
        Self::with_indent(4)
    }

    /// Indented JSON with `width` spaces per level.
    pub fn with_indent(width: usize) -> Self {
        Self {
            indent: Some(width),
        }
    }

    /// Spaces per level, or `None` for compact output.
    pub fn indent(&self) -> Option<usize> {
        self.indent
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, doc: &Value) -> Result<Vec<u8>> {
        match self.indent {
            None => serde_json::to_vec(doc).map_err(|e| Error::Persistence(e.to_string())),
            Some(width) => {
                let indent = vec![b' '; width];
                let mut buf = Vec::with_capacity(128);
                let mut ser = serde_json::Serializer::with_formatter(
                    &mut buf,
                    PrettyFormatter::with_indent(&indent),
                );
                doc.serialize(&mut ser)
                    .map_err(|e| Error::Persistence(e.to_string()))?;
                Ok(buf)
            }
        }
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compact_is_one_line() {
        let out = JsonSerializer::new()
            .serialize(&json!({"b": 1, "a": [true, null]}))
            .unwrap();
        assert_eq!(out, br#"{"a":[true,null],"b":1}"#);
    }

    #[test]
    fn pretty_uses_requested_indent() {
        let out = JsonSerializer::with_indent(2)
            .serialize(&json!({"k": 1}))
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"k\": 1\n}");

        let out = JsonSerializer::pretty().serialize(&json!({"k": 1})).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\n    \"k\": 1\n}");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = JsonSerializer::new().deserialize(b"{not json").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
