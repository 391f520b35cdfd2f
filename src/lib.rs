//! Write-through JSON documents with shared, path-addressable store handles.
//!
//! Open a file, get a [`Store`], and read or write anywhere in the tree. Every
//! store opened on the same file shares one in-memory document, and every
//! mutation rewrites the whole file before it returns.
//!
//! ```rust,no_run
//! use json_stores::open_at;
//!
//! let window = open_at("settings.json", ["ui", "window"]).unwrap();
//! window.set("width", 1280).unwrap();
//!
//! let ui = json_stores::open("settings.json").unwrap().at(["ui"]);
//! assert_eq!(ui.at(["window"]).get("width").unwrap(), 1280);
//! ```
//!
//! **Single-process only.** If multiple processes open the same file they will
//! clobber each other. Use advisory file locking or a real database for
//! multi-process access.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod path;
pub mod persist;
pub mod registry;
pub mod serializer;
pub mod store;
pub mod tree;

pub use document::Document;
pub use error::{Error, Result};
pub use path::{KeyPath, Segment};
pub use registry::{Registry, RegistryBuilder};
pub use serializer::{JsonSerializer, Serializer};
pub use serde_json::{json, Value};
pub use store::Store;

use std::path::Path;

/// Store over the root of `identifier`, through the [global](Registry::global)
/// registry.
pub fn open(identifier: impl AsRef<Path>) -> Result<Store> {
    Registry::global().open(identifier)
}

/// Store over `path` inside `identifier`, through the
/// [global](Registry::global) registry.
pub fn open_at<I, S>(identifier: impl AsRef<Path>, path: I) -> Result<Store>
where
    I: IntoIterator<Item = S>,
    S: Into<Segment>,
{
    Registry::global().open_at(identifier, path)
}
