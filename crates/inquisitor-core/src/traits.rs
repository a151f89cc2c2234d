use async_trait::async_trait;

use crate::{Result, SearchResult};

/// A web search backend that turns a query into ranked results.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns the unique identifier for this provider.
    fn name(&self) -> &'static str;

    /// Searches for `query`, returning at most `count` results in rank order.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is not configured, the request fails,
    /// or the response cannot be parsed.
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>>;
}

/// An LLM backend that writes a cited answer from search results.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Returns the unique identifier for this synthesizer.
    fn name(&self) -> &'static str;

    /// Produces an answer to `query` whose `[k]` markers cite `results[k - 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the synthesizer is not configured, the request
    /// fails, or the response carries no answer.
    async fn synthesize(&self, query: &str, results: &[SearchResult]) -> Result<String>;
}
