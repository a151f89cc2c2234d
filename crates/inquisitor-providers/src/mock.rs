//! Mock collaborators for testing the answer pipeline.
//!
//! Both mocks return scripted output and record every call, so tests can
//! assert whether a query reached the network layer or was served from cache.

use async_trait::async_trait;
use inquisitor_core::{Error, IgnoreLock as _, Result, SearchProvider, SearchResult, Synthesizer};
use std::sync::{Arc, Mutex};

/// Call history shared between clones.
type CallHistory = Arc<Mutex<Vec<String>>>;

/// Search provider returning the same results for every query.
#[derive(Clone, Default)]
pub struct MockSearch {
    /// Results returned for every query
    results: Vec<SearchResult>,
    /// Error message returned instead of results
    failure: Option<String>,
    /// Queries received
    call_history: CallHistory,
}

impl MockSearch {
    /// Mock returning `results` for every query.
    #[must_use]
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            failure: None,
            call_history: Arc::default(),
        }
    }

    /// Mock failing every search with a provider error.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            failure: Some(message.into()),
            call_history: Arc::default(),
        }
    }

    /// Queries received so far.
    #[must_use]
    pub fn get_call_history(&self) -> Vec<String> {
        self.call_history.lock_ignore_poison().clone()
    }

    /// Number of searches made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_history.lock_ignore_poison().len()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>> {
        self.call_history.lock_ignore_poison().push(query.to_owned());

        if let Some(message) = &self.failure {
            return Err(Error::Provider(message.clone()));
        }
        Ok(self.results.iter().take(count).cloned().collect())
    }
}

/// Synthesizer returning a fixed answer.
#[derive(Clone)]
pub struct MockSynthesizer {
    /// Answer returned for every query
    answer: String,
    /// Queries received
    call_history: CallHistory,
}

impl MockSynthesizer {
    /// Mock answering every query with `answer`.
    #[must_use]
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            call_history: Arc::default(),
        }
    }

    /// Number of answers synthesized.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_history.lock_ignore_poison().len()
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn synthesize(&self, query: &str, _results: &[SearchResult]) -> Result<String> {
        self.call_history.lock_ignore_poison().push(query.to_owned());
        Ok(self.answer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_search_truncates_and_records() {
        let search = MockSearch::new(vec![
            SearchResult::new("One", "https://one", "first"),
            SearchResult::new("Two", "https://two", "second"),
        ]);

        let results = search.search("rust", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(search.get_call_history(), vec!["rust".to_owned()]);
    }

    #[tokio::test]
    async fn test_mock_search_failure() {
        let search = MockSearch::failing("quota exceeded");
        let error = search.search("rust", 8).await.unwrap_err();
        assert!(matches!(error, Error::Provider(_)));
        assert_eq!(search.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_synthesizer_clones_share_history() {
        let synthesizer = MockSynthesizer::new("Paris [1]");
        let clone = synthesizer.clone();

        assert_eq!(clone.synthesize("q", &[]).await.unwrap(), "Paris [1]");
        assert_eq!(synthesizer.call_count(), 1);
    }
}
