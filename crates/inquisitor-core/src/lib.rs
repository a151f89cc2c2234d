//! Core types and traits for Inquisitor.
//!
//! This crate provides the search-result value type, the collaborator traits
//! for search providers and answer synthesizers, error handling, and the
//! on-disk configuration shared by the cache, provider and CLI crates.

/// Configuration loading and defaults.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Helpers for poisoned locks.
pub mod sync;
/// Trait definitions for search providers and synthesizers.
pub mod traits;
/// Core data types for search results.
pub mod types;

pub use config::{CacheConfig, InquisitorConfig, LlmConfig, SearchConfig};
pub use error::{Error, Result};
pub use sync::IgnoreLock;
pub use traits::{SearchProvider, Synthesizer};
pub use types::{SearchResult, format_results_for_prompt};
