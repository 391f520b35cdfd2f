//! Unified error type for all store operations.

use crate::path::KeyPath;

/// Things that can go wrong when using a store.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Existing backing content could not be read.
    Io(String),
    /// Backing content is not valid JSON, or its root is not an object/array.
    Parse(String),
    /// No value at `path`.
    KeyNotFound {
        /// Full path (from the document root) that failed to resolve.
        path: KeyPath,
    },
    /// A segment of `path` resolved to the wrong kind of value.
    PathType {
        /// Path (from the document root) up to and including the offending value.
        path: KeyPath,
        /// What the operation needed there.
        expected: &'static str,
        /// What was actually found.
        found: &'static str,
    },
    /// Writing the backing file failed. The in-memory document has already
    /// been changed; call [`Document::flush`](crate::Document::flush) to retry.
    Persistence(String),
    /// A typed accessor could not convert to or from JSON.
    Convert(String),
    /// The document was evicted from its registry and no longer accepts
    /// writes. Reopen the identifier to get the live document.
    Detached(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(msg) => write!(f, "i/o error: {msg}"),
            Error::Parse(msg) => write!(f, "parse error: {msg}"),
            Error::KeyNotFound { path } => write!(f, "key not found: {path}"),
            Error::PathType {
                path,
                expected,
                found,
            } => write!(f, "path type error at {path}: expected {expected}, found {found}"),
            Error::Persistence(msg) => write!(f, "persistence error: {msg}"),
            Error::Convert(msg) => write!(f, "conversion error: {msg}"),
            Error::Detached(id) => write!(f, "document {id} was evicted; reopen it to write"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.to_string())
        } else if err.is_syntax() || err.is_eof() {
            Error::Parse(err.to_string())
        } else {
            Error::Convert(err.to_string())
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_json_errors_are_classified() {
        let syntax = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        assert!(matches!(Error::from(syntax), Error::Parse(_)));

        let eof = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err();
        assert!(matches!(Error::from(eof), Error::Parse(_)));

        let data = serde_json::from_value::<u32>(serde_json::json!("text")).unwrap_err();
        assert!(matches!(Error::from(data), Error::Convert(_)));
    }
}
