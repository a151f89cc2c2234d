//! Durable storage for the entry collection.
//!
//! The collection is stored as one JSON array. Writes go to a temporary file in
//! the same directory which is then renamed over the cache file, so a crash
//! leaves either the old or the new contents on disk, never a partial write.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use inquisitor_core::IgnoreLock as _;
use tempfile::NamedTempFile;

use crate::entry::CachedEntry;
use crate::error::{CacheError, Result};

/// File name of the cache inside its directory.
pub const CACHE_FILE_NAME: &str = "qa_cache.json";

/// Owner of the durable copy of the entry collection.
pub trait CacheBackend: Send {
    /// Reads all entries.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    ///
    /// # Errors
    /// Returns `CacheError::Corrupt` if stored data cannot be parsed and
    /// `CacheError::Io` if it cannot be read
    fn read(&self) -> Result<Option<Vec<CachedEntry>>>;

    /// Replaces the durable copy with `entries`.
    ///
    /// # Errors
    /// Returns an error if the entries cannot be serialized or written
    fn write(&self, entries: &[CachedEntry]) -> Result<()>;

    /// Size in bytes of the serialized form currently stored.
    ///
    /// # Errors
    /// Returns an error if the stored size cannot be determined
    fn size_bytes(&self) -> Result<u64>;
}

impl<B: CacheBackend + Sync + ?Sized> CacheBackend for Arc<B> {
    fn read(&self) -> Result<Option<Vec<CachedEntry>>> {
        (**self).read()
    }

    fn write(&self, entries: &[CachedEntry]) -> Result<()> {
        (**self).write(entries)
    }

    fn size_bytes(&self) -> Result<u64> {
        (**self).size_bytes()
    }
}

/// JSON file backend with atomic replace-on-write.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Backend for an explicit file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Backend for `qa_cache.json` inside `directory`.
    pub fn in_directory(directory: &Path) -> Self {
        Self::new(directory.join(CACHE_FILE_NAME))
    }

    /// Location of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl CacheBackend for JsonFileBackend {
    fn read(&self) -> Result<Option<Vec<CachedEntry>>> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        serde_json::from_slice(&contents)
            .map(Some)
            .map_err(|source| CacheError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn write(&self, entries: &[CachedEntry]) -> Result<()> {
        let directory = self.directory();
        fs::create_dir_all(directory)?;

        let json = serde_json::to_vec_pretty(entries)?;

        let mut staging = NamedTempFile::new_in(directory)?;
        staging.write_all(&json)?;
        staging.as_file().sync_all()?;
        staging
            .persist(&self.path)
            .map_err(|error| CacheError::Io(error.error))?;

        tracing::debug!(
            path = %self.path.display(),
            entries = entries.len(),
            bytes = json.len(),
            "cache written"
        );
        Ok(())
    }

    fn size_bytes(&self) -> Result<u64> {
        match fs::metadata(&self.path) {
            Ok(metadata) => Ok(metadata.len()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(error) => Err(error.into()),
        }
    }
}

/// In-memory backend holding the serialized bytes.
///
/// Behaves like the file backend (including corruption detection) without
/// touching the filesystem, and can be told to fail writes.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    bytes: Mutex<Option<Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    /// Empty backend, as if no cache file existed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-loaded with raw stored bytes.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Makes every following write fail with an I/O error (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw stored bytes, if anything was written.
    pub fn stored_bytes(&self) -> Option<Vec<u8>> {
        self.bytes.lock_ignore_poison().clone()
    }
}

impl CacheBackend for MemoryBackend {
    fn read(&self) -> Result<Option<Vec<CachedEntry>>> {
        let guard = self.bytes.lock_ignore_poison();
        let Some(bytes) = guard.as_ref() else {
            return Ok(None);
        };
        serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|source| CacheError::Corrupt {
                path: PathBuf::from("<memory>"),
                source,
            })
    }

    fn write(&self, entries: &[CachedEntry]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Io(io::Error::other("simulated write failure")));
        }
        let json = serde_json::to_vec_pretty(entries)?;
        *self.bytes.lock_ignore_poison() = Some(json);
        Ok(())
    }

    fn size_bytes(&self) -> Result<u64> {
        Ok(self
            .bytes
            .lock_ignore_poison()
            .as_ref()
            .map_or(0, |bytes| bytes.len() as u64))
    }
}
