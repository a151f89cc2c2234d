//! Question/answer cache with similarity matching.
//!
//! Answers produced by the search and synthesis pipeline are kept in an
//! insertion-ordered collection persisted as JSON. Incoming questions are
//! matched against it either exactly (case and whitespace folded) or by a
//! textual similarity score, so rephrased questions can reuse an earlier
//! answer without another round of web search and LLM calls.

/// Cached question/answer records.
pub mod entry;
/// Error types for cache operations.
pub mod error;
/// Durable storage backends.
pub mod persistence;
/// Public cache contract.
pub mod service;
/// Textual similarity metrics and ranking.
pub mod similarity;
/// In-memory entry collection.
pub mod store;

pub use entry::CachedEntry;
pub use error::{CacheError, Result};
pub use persistence::{CACHE_FILE_NAME, CacheBackend, JsonFileBackend, MemoryBackend};
pub use service::{CacheService, CacheStats, ScoredEntry};
pub use similarity::{
    DEFAULT_SIMILARITY_THRESHOLD, GestaltRatio, NormalizedLevenshtein, SimilarityMetric,
    normalize_question, rank, similarity,
};
pub use store::EntryStore;
