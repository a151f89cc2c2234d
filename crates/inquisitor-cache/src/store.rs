//! In-memory entry collection backed by a [`CacheBackend`].

use crate::entry::CachedEntry;
use crate::error::{CacheError, Result};
use crate::persistence::CacheBackend;

/// Insertion-ordered collection of cached entries.
///
/// The store exclusively owns the in-memory entries; every mutation writes the
/// full collection back through the backend.
#[derive(Debug)]
pub struct EntryStore<B> {
    backend: B,
    entries: Vec<CachedEntry>,
    loaded: bool,
}

impl<B: CacheBackend> EntryStore<B> {
    /// Creates an unloaded store over `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            entries: Vec::new(),
            loaded: false,
        }
    }

    /// Whether [`load`](Self::load) has run.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replaces the in-memory collection with the durable copy.
    ///
    /// A missing durable copy yields an empty collection. On any failure the
    /// collection is left empty and the store still counts as loaded, so the
    /// error can be reported as a warning and the cache keeps working.
    ///
    /// # Errors
    /// Returns `CacheError::Corrupt` for unparseable data and
    /// `CacheError::Io` if the durable copy cannot be read
    pub fn load(&mut self) -> Result<()> {
        self.loaded = true;
        self.entries.clear();

        match self.backend.read() {
            Ok(Some(entries)) => {
                tracing::debug!(entries = entries.len(), "cache loaded");
                self.entries = entries;
                Ok(())
            }
            Ok(None) => {
                tracing::debug!("no cache on disk, starting empty");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    /// Appends `entry` and persists the whole collection.
    ///
    /// The entry stays in memory even if persisting fails.
    ///
    /// # Errors
    /// Returns the backend error if the collection could not be written
    pub fn append(&mut self, entry: CachedEntry) -> Result<()> {
        self.entries.push(entry);
        self.persist()
    }

    /// All entries in insertion order.
    pub fn all(&self) -> &[CachedEntry] {
        &self.entries
    }

    /// Most recently appended entry.
    pub fn last(&self) -> Option<&CachedEntry> {
        self.entries.last()
    }

    /// Empties the collection and persists the empty state.
    ///
    /// # Errors
    /// Returns the backend error if the empty collection could not be written
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.persist()
    }

    /// Size of the durable copy in bytes.
    ///
    /// # Errors
    /// Returns the backend error if the size cannot be determined
    pub fn durable_size(&self) -> Result<u64> {
        self.backend.size_bytes()
    }

    /// The backend this store writes through.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn persist(&self) -> Result<()> {
        self.backend.write(&self.entries).inspect_err(|error: &CacheError| {
            tracing::warn!("Failed to persist cache: {error}");
        })
    }
}
