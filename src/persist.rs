//! Disk I/O helpers: load from file, plain write, and atomic write.
//!
//! The rename-over approach is close to atomic on most platforms. On NTFS
//! (Windows) it's reliable; on FAT32 or network shares there are no hard
//! guarantees. If that matters to you, keep backups or use a real database.

use crate::error::{Error, Result};
use crate::serializer::Serializer;
use crate::tree;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Reads and deserializes the file at `path`. Returns `None` if the file is
/// missing or empty (not an error). The root must be an object or an array.
pub fn load<S: Serializer>(path: &Path, serializer: &S) -> Result<Option<Value>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::Io(format!("{}: {e}", path.display()))),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let doc = serializer.deserialize(&bytes)?;
    if !tree::is_container(&doc) {
        return Err(Error::Parse(format!(
            "{}: top-level value must be an object or array, found {}",
            path.display(),
            tree::kind(&doc)
        )));
    }
    Ok(Some(doc))
}

/// Overwrite `path` with `bytes` in place.
pub fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|e| Error::Persistence(format!("{}: {e}", path.display())))
}

/// Write `bytes` to a uniquely named temp file next to `path` and then rename
/// it over `path`. This avoids leaving a half-written file if the process
/// crashes mid-write, and the random name can't clash with another
/// document's backing file. The temp file is removed if anything fails.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let fail = |e: std::io::Error| Error::Persistence(format!("{}: {e}", path.display()));
    let mut tmp = NamedTempFile::new_in(dir).map_err(fail)?;
    tmp.write_all(bytes).map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}
