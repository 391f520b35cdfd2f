//! Process-wide cache of loaded documents, keyed by backing file.

use crate::document::Document;
use crate::error::Result;
use crate::path::{KeyPath, Segment};
use crate::serializer::JsonSerializer;
use crate::store::Store;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Maps backing identifiers to the one live [`Document`] for each.
///
/// Every [`Store`] handed out for the same identifier shares that document, so
/// a write through one is immediately visible through all the others.
/// Identifiers are compared exactly as given: `a.json` and `./a.json` are two
/// different entries.
///
/// **Single-process only.** Nothing stops another process from writing the
/// same file, and if one does the two will clobber each other.
pub struct Registry {
    documents: RwLock<HashMap<PathBuf, Arc<Document>>>,
    serializer: JsonSerializer,
    atomic: bool,
}

impl Registry {
    /// Registry with the default settings: 4-space indented JSON, atomic
    /// writes.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The shared default registry, created on first use.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// Shared document for `identifier`, loading it on first request.
    ///
    /// A missing or blank file starts out as an empty object and is written
    /// immediately. Fails with [`Parse`](crate::Error::Parse) if the file
    /// holds anything but a JSON object or array.
    pub fn get_or_create(&self, identifier: impl AsRef<Path>) -> Result<Arc<Document>> {
        let id = identifier.as_ref();
        if let Some(doc) = self.documents.read().get(id) {
            return Ok(Arc::clone(doc));
        }

        // Hold the write lock across the load so a file is never read twice.
        let mut documents = self.documents.write();
        if let Some(doc) = documents.get(id) {
            return Ok(Arc::clone(doc));
        }
        let doc = Arc::new(Document::load(
            id.to_path_buf(),
            self.serializer.clone(),
            self.atomic,
        )?);
        documents.insert(id.to_path_buf(), Arc::clone(&doc));
        Ok(doc)
    }

    /// Store over the root of `identifier`'s document.
    pub fn open(&self, identifier: impl AsRef<Path>) -> Result<Store> {
        Ok(Store::new(self.get_or_create(identifier)?, KeyPath::root()))
    }

    /// Store over `path` inside `identifier`'s document.
    pub fn open_at<I, S>(&self, identifier: impl AsRef<Path>, path: I) -> Result<Store>
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        Ok(Store::new(
            self.get_or_create(identifier)?,
            KeyPath::new(path),
        ))
    }

    /// Forget the document for `identifier`; the next open reloads from disk.
    ///
    /// The evicted document is detached first. Stores already handed out can
    /// still read its last state, but their writes fail with
    /// [`Detached`](crate::Error::Detached) so only one document ever writes
    /// to a given file.
    pub fn evict(&self, identifier: impl AsRef<Path>) -> bool {
        let id = identifier.as_ref();
        let mut documents = self.documents.write();
        let Some(doc) = documents.remove(id) else {
            return false;
        };
        doc.detach();
        debug!("evicted {}", id.display());
        true
    }

    /// `true` if `identifier` is currently loaded.
    #[must_use]
    pub fn contains(&self, identifier: impl AsRef<Path>) -> bool {
        self.documents.read().contains_key(identifier.as_ref())
    }

    /// Number of loaded documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// `true` when nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifiers of all loaded documents.
    #[must_use]
    pub fn identifiers(&self) -> Vec<PathBuf> {
        self.documents.read().keys().cloned().collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("documents", &self.len())
            .field("indent", &self.serializer.indent())
            .field("atomic", &self.atomic)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures a [`Registry`].
///
/// ```rust,no_run
/// use json_stores::Registry;
///
/// let registry = Registry::builder().indent(2).atomic(false).build();
/// let settings = registry.open("settings.json").unwrap();
/// settings.set("theme", "dark").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    pretty: bool,
    indent: usize,
    atomic: bool,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 4,
            atomic: true,
        }
    }
}

impl RegistryBuilder {
    /// Write indented JSON (default) or compact single-line JSON.
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Spaces per indentation level for pretty output (default: 4). Implies
    /// `pretty(true)`.
    pub fn indent(mut self, width: usize) -> Self {
        self.pretty = true;
        self.indent = width;
        self
    }

    /// Write through a temp file and rename (default), or overwrite the file
    /// in place.
    pub fn atomic(mut self, yes: bool) -> Self {
        self.atomic = yes;
        self
    }

    /// Finish configuring. Nothing is loaded until the first open.
    pub fn build(self) -> Registry {
        let serializer = if self.pretty {
            JsonSerializer::with_indent(self.indent)
        } else {
            JsonSerializer::new()
        };
        Registry {
            documents: RwLock::new(HashMap::new()),
            serializer,
            atomic: self.atomic,
        }
    }
}
