//! Public cache contract: lookups, storing, browsing and statistics.

use inquisitor_core::SearchResult;

use crate::entry::{CachedEntry, current_timestamp};
use crate::error::{CacheError, Result};
use crate::persistence::{CacheBackend, JsonFileBackend};
use crate::similarity::{GestaltRatio, SimilarityMetric, normalize_question, rank};
use crate::store::EntryStore;

/// Bytes per mebibyte, for display sizes.
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A cached entry paired with its similarity to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    /// The matching entry
    pub entry: CachedEntry,
    /// Similarity in `0.0..=1.0`
    pub score: f64,
}

/// Aggregate view of the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of stored entries
    pub total_entries: usize,
    /// Size of the durable serialized form
    pub cache_size_bytes: u64,
    /// Timestamp of the first stored entry
    pub oldest_entry_timestamp: Option<String>,
    /// Timestamp of the last stored entry
    pub newest_entry_timestamp: Option<String>,
}

impl CacheStats {
    /// Durable size in mebibytes.
    pub fn cache_size_mb(&self) -> f64 {
        self.cache_size_bytes as f64 / BYTES_PER_MB
    }
}

/// Question/answer cache over a durable backend.
///
/// The durable copy is read lazily by the first operation. A corrupt or
/// unreadable copy leaves the cache empty and is kept as a warning for the
/// caller (see [`take_load_warning`](Self::take_load_warning)).
pub struct CacheService<B = JsonFileBackend> {
    store: EntryStore<B>,
    metric: Box<dyn SimilarityMetric>,
    load_warning: Option<CacheError>,
}

impl<B: CacheBackend> CacheService<B> {
    /// Creates an unloaded cache using the gestalt similarity metric.
    pub fn new(backend: B) -> Self {
        Self {
            store: EntryStore::new(backend),
            metric: Box::new(GestaltRatio),
            load_warning: None,
        }
    }

    /// Replaces the similarity metric.
    #[must_use]
    pub fn with_metric(mut self, metric: Box<dyn SimilarityMetric>) -> Self {
        self.metric = metric;
        self
    }

    /// Whether the durable copy has been read.
    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    /// Takes the error from loading the durable copy, if there was one.
    pub fn take_load_warning(&mut self) -> Option<CacheError> {
        self.ensure_loaded();
        self.load_warning.take()
    }

    /// Most recent entry whose question matches `query` ignoring case and
    /// whitespace.
    pub fn find_exact_match(&mut self, query: &str) -> Option<CachedEntry> {
        self.ensure_loaded();
        let wanted = normalize_question(query);

        let found = self
            .store
            .all()
            .iter()
            .rev()
            .find(|entry| entry.normalized_question() == wanted)
            .cloned();

        tracing::debug!(query, hit = found.is_some(), "exact cache lookup");
        found
    }

    /// Entries scoring at least `min_similarity` against `query`, best first,
    /// at most `max_results` of them.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidArgument` if `min_similarity` is outside
    /// `0.0..=1.0` or `max_results` is zero
    pub fn find_similar_questions(
        &mut self,
        query: &str,
        min_similarity: f64,
        max_results: usize,
    ) -> Result<Vec<ScoredEntry>> {
        if !(0.0..=1.0).contains(&min_similarity) {
            return Err(CacheError::InvalidArgument(format!(
                "min_similarity must be within 0.0..=1.0, got {min_similarity}"
            )));
        }
        validate_max_results(max_results)?;
        self.ensure_loaded();

        let matches: Vec<ScoredEntry> = rank(
            self.metric.as_ref(),
            query,
            self.store.all(),
            min_similarity,
            max_results,
        )
        .into_iter()
        .map(|(entry, score)| ScoredEntry {
            entry: entry.clone(),
            score,
        })
        .collect();

        tracing::debug!(
            query,
            metric = self.metric.name(),
            min_similarity,
            matches = matches.len(),
            "similar cache lookup"
        );
        Ok(matches)
    }

    /// Entries whose question or answer contains `term` (case-insensitive),
    /// in insertion order, at most `max_results` of them.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidArgument` if `max_results` is zero
    pub fn search_cache(&mut self, term: &str, max_results: usize) -> Result<Vec<CachedEntry>> {
        validate_max_results(max_results)?;
        self.ensure_loaded();

        let needle = term.to_lowercase();
        Ok(self
            .store
            .all()
            .iter()
            .filter(|entry| {
                entry.question().to_lowercase().contains(&needle)
                    || entry.answer().to_lowercase().contains(&needle)
            })
            .take(max_results)
            .cloned()
            .collect())
    }

    /// Stores a new entry stamped with the current time.
    ///
    /// Identical questions are not deduplicated; lookups prefer the newest.
    /// The entry remains available in memory even if persisting fails.
    ///
    /// # Errors
    /// Returns the backend error if the cache could not be written
    pub fn store_qa(
        &mut self,
        question: &str,
        answer: &str,
        results: Vec<SearchResult>,
    ) -> Result<()> {
        self.ensure_loaded();

        // Never stamp earlier than the previous entry, even if the clock moved back.
        let mut timestamp = current_timestamp();
        if let Some(previous) = self.store.last()
            && previous.timestamp() > timestamp.as_str()
        {
            previous.timestamp().clone_into(&mut timestamp);
        }

        let entry = CachedEntry::new(question, answer, results, timestamp);
        self.store.append(entry)?;
        tracing::info!(question, entries = self.store.all().len(), "answer cached");
        Ok(())
    }

    /// Up to `count` entries, most recent first.
    pub fn get_recent_entries(&mut self, count: usize) -> Vec<CachedEntry> {
        self.ensure_loaded();
        self.store.all().iter().rev().take(count).cloned().collect()
    }

    /// Entry count, durable size and timestamp range.
    ///
    /// # Errors
    /// Returns the backend error if the durable size cannot be determined
    pub fn get_cache_stats(&mut self) -> Result<CacheStats> {
        self.ensure_loaded();
        let entries = self.store.all();

        Ok(CacheStats {
            total_entries: entries.len(),
            cache_size_bytes: self.store.durable_size()?,
            oldest_entry_timestamp: entries.first().map(|entry| entry.timestamp().to_owned()),
            newest_entry_timestamp: entries.last().map(|entry| entry.timestamp().to_owned()),
        })
    }

    /// Removes every entry. Irreversible.
    ///
    /// # Errors
    /// Returns the backend error if the empty cache could not be written
    pub fn clear_cache(&mut self) -> Result<()> {
        self.ensure_loaded();
        self.store.clear()?;
        tracing::info!("cache cleared");
        Ok(())
    }

    /// Number of cached entries.
    pub fn len(&mut self) -> usize {
        self.ensure_loaded();
        self.store.all().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// The backend the cache writes through.
    pub fn backend(&self) -> &B {
        self.store.backend()
    }

    fn ensure_loaded(&mut self) {
        if self.store.is_loaded() {
            return;
        }
        if let Err(error) = self.store.load() {
            tracing::warn!("Cache unavailable, starting empty: {error}");
            self.load_warning = Some(error);
        }
    }
}

fn validate_max_results(max_results: usize) -> Result<()> {
    if max_results == 0 {
        return Err(CacheError::InvalidArgument(
            "max_results must be at least 1".to_owned(),
        ));
    }
    Ok(())
}
