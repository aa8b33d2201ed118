//! File-backed JSON array store.
//!
//! Each store is a single pretty-printed JSON array on disk. Mutations follow a strict
//! read-modify-write cycle under an exclusive advisory lock:
//!
//! 1. lock `<file>.lock` (`flock(LOCK_EX)` via `fs2`)
//! 2. read and decode the whole array (missing, empty, or corrupt contents read as `[]`)
//! 3. apply the mutation
//! 4. write the whole array to a temp file in the same directory and rename it into place
//! 5. unlock
//!
//! The lock lives on a sidecar file because step 4 replaces the data file's inode; a lock
//! held on the data file itself would stop excluding anyone after the first rename.
//!
//! If the lock cannot be taken (filesystem without flock support, permission problems on
//! the sidecar) the cycle still runs unlocked, logging a warning. Concurrent writers may
//! then lose updates, but the file on disk is still always a complete array.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::warn;

use crate::error::CommonError;
use crate::store::ArrayBackend;

const INDENT: &[u8] = b"    ";

#[derive(Debug, Clone)]
pub struct FileArrayBackend {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileArrayBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = sidecar_lock_path(&path);
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the exclusive lock, or `None` when locking is unavailable.
    fn acquire(&self) -> Option<LockGuard> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .inspect_err(|e| {
                warn!(
                    error = %e,
                    lock = %self.lock_path.display(),
                    "cannot open store lock file, continuing unlocked"
                )
            })
            .ok()?;

        file.lock_exclusive()
            .inspect_err(|e| {
                warn!(
                    error = %e,
                    lock = %self.lock_path.display(),
                    "cannot lock store, continuing unlocked"
                )
            })
            .ok()?;

        Some(LockGuard { file })
    }

    fn read_items(&self) -> Result<Vec<Value>, CommonError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CommonError::io(&self.path, e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice::<Vec<Value>>(&bytes)
            .inspect_err(|e| {
                warn!(
                    error = %e,
                    store = %self.path.display(),
                    "store contents are not a JSON array, treating as empty"
                )
            })
            .unwrap_or_default())
    }

    fn write_items(&self, items: &[Value]) -> Result<(), CommonError> {
        write_atomic(&self.path, &encode_pretty(items)?)
    }
}

impl ArrayBackend for FileArrayBackend {
    fn ensure(&self) -> Result<(), CommonError> {
        if self.path.exists() {
            return Ok(());
        }
        let _guard = self.acquire();
        // Re-check under the lock: another writer may have created and filled it meanwhile.
        if self.path.exists() {
            return Ok(());
        }
        self.write_items(&[])
    }

    fn load(&self) -> Result<Vec<Value>, CommonError> {
        self.read_items()
    }

    fn update(&self, apply: &mut dyn FnMut(&mut Vec<Value>)) -> Result<(), CommonError> {
        let _guard = self.acquire();
        let mut items = self.read_items()?;
        apply(&mut items);
        self.write_items(&items)
    }

    fn inspect(
        &self,
        read: &mut dyn FnMut(&[Value]) -> Result<(), CommonError>,
    ) -> Result<(), CommonError> {
        let _guard = self.acquire();
        let items = self.read_items()?;
        read(&items)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(error = %e, "cannot release store lock");
        }
    }
}

fn sidecar_lock_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    path.with_file_name(format!("{name}.lock"))
}

/// Pretty-print with 4-space indentation.
pub fn encode_pretty<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CommonError> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

/// Write `bytes` to `path` through a temp file in the same directory and a rename, so
/// readers never observe a partially written file.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CommonError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| CommonError::io(parent, e))?;
    temp.write_all(bytes).map_err(|e| CommonError::io(path, e))?;
    temp.flush().map_err(|e| CommonError::io(path, e))?;
    temp.persist(path).map_err(|e| CommonError::io(path, e.error))?;
    Ok(())
}
