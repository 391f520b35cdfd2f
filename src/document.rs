//! One loaded JSON tree and the lock that guards it.

use crate::error::{Error, Result};
use crate::persist::{atomic_write, load, write};
use crate::serializer::{JsonSerializer, Serializer};
use log::{debug, trace, warn};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// The in-memory tree for one backing file.
///
/// Shared (behind an `Arc`) by every [`Store`](crate::Store) opened on the same
/// identifier. All access goes through a single mutex, and mutations hold it
/// across the write to disk, so the file never sees interleaved updates from
/// two threads.
///
/// Once [evicted](crate::Registry::evict) a document is detached: reads keep
/// working against its last state, but every write (including
/// [`flush`](Self::flush)) fails with [`Error::Detached`] and leaves the file
/// alone, so it can never overwrite the document that replaced it.
pub struct Document {
    identifier: PathBuf,
    serializer: JsonSerializer,
    atomic: bool,
    detached: AtomicBool,
    root: Mutex<Value>,
}

impl Document {
    /// Load `identifier`, or start an empty object and write it out if the
    /// file is missing or blank.
    pub(crate) fn load(identifier: PathBuf, serializer: JsonSerializer, atomic: bool) -> Result<Self> {
        let loaded = load(&identifier, &serializer)?;
        let fresh = loaded.is_none();
        let doc = Document {
            root: Mutex::new(loaded.unwrap_or_else(|| Value::Object(Map::new()))),
            identifier,
            serializer,
            atomic,
            detached: AtomicBool::new(false),
        };
        if fresh {
            doc.flush()?;
            debug!("created {}", doc.identifier.display());
        } else {
            debug!("loaded {}", doc.identifier.display());
        }
        Ok(doc)
    }

    /// Backing file this document persists to.
    #[must_use]
    pub fn identifier(&self) -> &Path {
        &self.identifier
    }

    /// Copy of the whole tree.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.root.lock().clone()
    }

    /// Rewrite the backing file from the current tree.
    ///
    /// Mutating store operations already do this; call it yourself to retry
    /// after a [`Persistence`](crate::Error::Persistence) error.
    pub fn flush(&self) -> Result<()> {
        let root = self.root.lock();
        self.ensure_attached()?;
        self.persist(&root)
    }

    /// `true` once the document has been evicted from its registry.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    /// Refuse all further writes. Takes the lock so a write already in
    /// progress finishes first.
    pub(crate) fn detach(&self) {
        let _root = self.root.lock();
        self.detached.store(true, Ordering::Release);
    }

    fn ensure_attached(&self) -> Result<()> {
        if self.is_detached() {
            return Err(Error::Detached(self.identifier.display().to_string()));
        }
        Ok(())
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.root.lock())
    }

    /// Apply `f` and persist the result, all under the lock. `f` must leave
    /// the tree untouched when it returns an error.
    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut Value) -> Result<R>) -> Result<R> {
        self.modify(|root| f(root).map(|out| (out, true)))
    }

    /// Like [`mutate`](Self::mutate), but `f` reports whether it changed
    /// anything; nothing is written when it didn't.
    pub(crate) fn modify<R>(&self, f: impl FnOnce(&mut Value) -> Result<(R, bool)>) -> Result<R> {
        let mut root = self.root.lock();
        self.ensure_attached()?;
        let (out, dirty) = f(&mut root)?;
        if dirty {
            self.persist(&root)?;
        }
        Ok(out)
    }

    fn persist(&self, root: &Value) -> Result<()> {
        let bytes = self.serializer.serialize(root)?;
        let res = if self.atomic {
            atomic_write(&self.identifier, &bytes)
        } else {
            write(&self.identifier, &bytes)
        };
        match &res {
            Ok(()) => trace!("wrote {} bytes to {}", bytes.len(), self.identifier.display()),
            Err(e) => warn!("{e}; in-memory document is ahead of disk"),
        }
        res
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("identifier", &self.identifier)
            .field("indent", &self.serializer.indent())
            .field("atomic", &self.atomic)
            .field("detached", &self.is_detached())
            .finish_non_exhaustive()
    }
}
