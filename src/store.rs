//! Path-bound handles onto a shared document.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::path::{KeyPath, Segment};
use crate::tree;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// A view of one location inside a shared [`Document`].
///
/// A store is just a document reference plus a [`KeyPath`]; it owns no data.
/// Navigation never touches the disk and never fails. The path is resolved
/// on every access, so a store opened on a path that doesn't exist yet starts
/// working as soon as something is written there.
///
/// Reads return owned copies taken under the document lock. Every mutating
/// method writes the *entire* document back to its backing file before it
/// returns, while still holding the lock. If that write fails you get
/// [`Error::Persistence`] and the in-memory change stays in place.
#[derive(Clone)]
pub struct Store {
    document: Arc<Document>,
    path: KeyPath,
}

impl Store {
    pub(crate) fn new(document: Arc<Document>, path: KeyPath) -> Self {
        Self { document, path }
    }

    // ---- navigation ----

    /// Sub-store at this path plus `path`. No I/O; a path that runs through a
    /// scalar only fails once you use the store.
    #[must_use]
    pub fn at<I, S>(&self, path: I) -> Store
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        Store::new(Arc::clone(&self.document), self.path.join(&KeyPath::new(path)))
    }

    /// Sub-store one segment down.
    #[must_use]
    pub fn child(&self, segment: impl Into<Segment>) -> Store {
        Store::new(Arc::clone(&self.document), self.path.child(segment))
    }

    /// Location of this store from the document root.
    #[must_use]
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// Backing file of the underlying document.
    #[must_use]
    pub fn identifier(&self) -> &Path {
        self.document.identifier()
    }

    /// The shared document.
    #[must_use]
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    // ---- reads ----

    /// Run `f` on the value at this store's path without copying it. The
    /// document is locked while `f` runs, so don't call back into any store
    /// on the same document from inside it.
    pub fn view<R>(&self, f: impl FnOnce(&Value) -> R) -> Result<R> {
        self.document
            .read(|root| tree::resolve(root, &self.path).map(f))
    }

    /// Copy of the value at this store's path.
    pub fn value(&self) -> Result<Value> {
        self.view(Value::clone)
    }

    /// Copy of the value under `key`. Fails with [`Error::KeyNotFound`] if
    /// absent.
    pub fn get(&self, key: impl Into<Segment>) -> Result<Value> {
        let path = self.path.child(key);
        self.document
            .read(|root| tree::resolve(root, &path).cloned())
    }

    /// Like [`get`](Self::get), but returns `default` when the key (or this
    /// store's own path) is missing.
    pub fn get_or(&self, key: impl Into<Segment>, default: impl Into<Value>) -> Result<Value> {
        match self.get(key) {
            Err(Error::KeyNotFound { .. }) => Ok(default.into()),
            other => other,
        }
    }

    /// Value under `key`, deserialized into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: impl Into<Segment>) -> Result<T> {
        let value = self.get(key)?;
        serde_json::from_value(value).map_err(Error::from)
    }

    /// `true` if `key` is present. For arrays, `true` if it's an index in
    /// range.
    pub fn contains_key(&self, key: impl Into<Segment>) -> Result<bool> {
        let key = key.into();
        self.with_container(|node| match (node, &key) {
            (Container::Object(map), Segment::Key(k)) => map.contains_key(k),
            (Container::Object(_), Segment::Index(_)) => false,
            (Container::Array(arr), seg) => seg.as_index().is_some_and(|i| i < arr.len()),
        })
    }

    /// `true` if `value` is an element of the array, or one of the object's
    /// member values.
    pub fn contains(&self, value: &Value) -> Result<bool> {
        self.with_container(|node| match node {
            Container::Object(map) => map.values().any(|v| v == value),
            Container::Array(arr) => arr.contains(value),
        })
    }

    /// Number of members or elements.
    pub fn len(&self) -> Result<usize> {
        self.with_container(|node| match node {
            Container::Object(map) => map.len(),
            Container::Array(arr) => arr.len(),
        })
    }

    /// `true` when there are no members or elements.
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|n| n == 0)
    }

    /// Member names of the object at this path, in key order. Each call reads
    /// the current state.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.with_object(|map| map.keys().cloned().collect())
    }

    /// Members of the object at this path, in key order.
    pub fn items(&self) -> Result<Vec<(String, Value)>> {
        self.with_object(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Member values of an object, or the elements of an array.
    pub fn values(&self) -> Result<Vec<Value>> {
        self.with_container(|node| match node {
            Container::Object(map) => map.values().cloned().collect(),
            Container::Array(arr) => arr.clone(),
        })
    }

    // ---- writes ----

    /// Write `value` under `key`, creating missing objects along this store's
    /// path. Returns the previous value, if any. Persists the document.
    pub fn set(&self, key: impl Into<Segment>, value: impl Into<Value>) -> Result<Option<Value>> {
        let path = self.path.child(key);
        let value = value.into();
        self.document.mutate(|root| tree::insert(root, &path, value))
    }

    /// Serialize `value` and write it under `key`. Persists the document.
    pub fn set_as<T: Serialize + ?Sized>(
        &self,
        key: impl Into<Segment>,
        value: &T,
    ) -> Result<Option<Value>> {
        self.set(key, serde_json::to_value(value)?)
    }

    /// Overwrite the value at this store's own path (creating missing parent
    /// objects). At the root, `value` must be an object or array. Persists
    /// the document.
    pub fn replace(&self, value: impl Into<Value>) -> Result<Option<Value>> {
        let value = value.into();
        self.document
            .mutate(|root| tree::insert(root, &self.path, value))
    }

    /// Remove `key` and return what was there. A missing key is an
    /// [`Error::KeyNotFound`] and nothing is written. Persists the document.
    pub fn delete(&self, key: impl Into<Segment>) -> Result<Value> {
        let path = self.path.child(key);
        self.document.mutate(|root| tree::remove(root, &path))
    }

    /// Push `value` onto the array at this store's path, creating an empty
    /// array there first if nothing exists yet. Returns the new element's
    /// index. Persists the document.
    pub fn append(&self, value: impl Into<Value>) -> Result<usize> {
        let value = value.into();
        self.document
            .mutate(|root| tree::push(root, &self.path, value))
    }

    /// Mutate the value under `key` in place. Returns `false` (and writes
    /// nothing) if the key doesn't exist; otherwise persists the document.
    pub fn update<F>(&self, key: impl Into<Segment>, f: F) -> Result<bool>
    where
        F: FnOnce(&mut Value),
    {
        let path = self.path.child(key);
        self.document.modify(|root| match tree::resolve_mut(root, &path) {
            Ok(value) => {
                f(value);
                Ok((true, true))
            }
            Err(Error::KeyNotFound { .. }) => Ok((false, false)),
            Err(e) => Err(e),
        })
    }

    /// Return the value under `key`, or write `default` there and return it.
    /// Persists the document only when it inserts.
    pub fn get_or_insert(&self, key: impl Into<Segment>, default: impl Into<Value>) -> Result<Value> {
        let path = self.path.child(key);
        let default = default.into();
        self.document.modify(|root| {
            if let Ok(existing) = tree::resolve(root, &path) {
                return Ok((existing.clone(), false));
            }
            tree::insert(root, &path, default.clone())?;
            Ok((default, true))
        })
    }

    /// Write every `(key, value)` pair, persisting once at the end. If any
    /// pair fails, none are applied. Missing objects along this store's path
    /// are created as with [`set`](Self::set).
    pub fn extend<I, K, V>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Segment>,
        V: Into<Value>,
    {
        let entries: Vec<(KeyPath, Value)> = entries
            .into_iter()
            .map(|(k, v)| (KeyPath::root().child(k), v.into()))
            .collect();
        if entries.is_empty() {
            return Ok(());
        }
        self.document.mutate(|root| {
            // Stage the batch on a copy of this store's subtree only.
            let existing = match tree::resolve(root, &self.path) {
                Ok(node) => Some(node.clone()),
                // A fresh object can't take an index; report the missing path.
                Err(e @ Error::KeyNotFound { .. }) => {
                    if entries.iter().any(|(key, _)| matches!(key.segments(), [Segment::Index(_)])) {
                        return Err(e);
                    }
                    None
                }
                Err(e) => return Err(e),
            };
            let exists = existing.is_some();
            let mut next = existing.unwrap_or_else(|| Value::Object(Map::new()));
            for (key, value) in entries {
                tree::insert(&mut next, &key, value).map_err(|e| self.rebase(e))?;
            }
            if exists {
                *tree::resolve_mut(root, &self.path)? = next;
            } else {
                tree::insert(root, &self.path, next)?;
            }
            Ok(())
        })
    }

    /// Empty the object or array at this store's path. Persists the document.
    pub fn clear(&self) -> Result<()> {
        self.document.mutate(|root| match tree::resolve_mut(root, &self.path)? {
            Value::Object(map) => {
                map.clear();
                Ok(())
            }
            Value::Array(arr) => {
                arr.clear();
                Ok(())
            }
            other => Err(Error::PathType {
                path: self.path.clone(),
                expected: "object or array",
                found: tree::kind(other),
            }),
        })
    }

    // ---- internal ----

    /// Turn an error raised against a staged copy of this store's subtree
    /// into one with a path from the document root.
    fn rebase(&self, err: Error) -> Error {
        match err {
            Error::KeyNotFound { path } => Error::KeyNotFound {
                path: self.path.join(&path),
            },
            Error::PathType {
                path,
                expected,
                found,
            } => Error::PathType {
                path: self.path.join(&path),
                expected,
                found,
            },
            other => other,
        }
    }

    fn with_container<R>(&self, f: impl FnOnce(Container<'_>) -> R) -> Result<R> {
        self.document.read(|root| match tree::resolve(root, &self.path)? {
            Value::Object(map) => Ok(f(Container::Object(map))),
            Value::Array(arr) => Ok(f(Container::Array(arr))),
            other => Err(Error::PathType {
                path: self.path.clone(),
                expected: "object or array",
                found: tree::kind(other),
            }),
        })
    }

    fn with_object<R>(&self, f: impl FnOnce(&Map<String, Value>) -> R) -> Result<R> {
        self.document.read(|root| match tree::resolve(root, &self.path)? {
            Value::Object(map) => Ok(f(map)),
            other => Err(Error::PathType {
                path: self.path.clone(),
                expected: "object",
                found: tree::kind(other),
            }),
        })
    }
}

enum Container<'a> {
    Object(&'a Map<String, Value>),
    Array(&'a Vec<Value>),
}

/// Two stores are equal when they share a document and point at the same
/// path.
impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.document, &other.document) && self.path == other.path
    }
}

impl Eq for Store {}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("identifier", &self.document.identifier())
            .field("path", &self.path.to_string())
            .finish()
    }
}
