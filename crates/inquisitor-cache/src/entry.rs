//! Cached question/answer records.

use chrono::{SecondsFormat, Utc};
use inquisitor_core::SearchResult;
use serde::{Deserialize, Serialize};

use crate::similarity::normalize_question;

/// One resolved question and the answer produced for it.
///
/// Entries are immutable once created: the collection only ever grows by
/// appending or shrinks by clearing everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntry {
    /// Question exactly as the user typed it
    question: String,
    /// Synthesized answer with `[k]` citation markers
    answer: String,
    /// Search results the answer cites, in their original order
    results: Vec<SearchResult>,
    /// RFC 3339 creation time
    timestamp: String,
}

impl CachedEntry {
    /// Creates an entry with an explicit timestamp.
    pub fn new<Q, A, T>(question: Q, answer: A, results: Vec<SearchResult>, timestamp: T) -> Self
    where
        Q: Into<String>,
        A: Into<String>,
        T: Into<String>,
    {
        Self {
            question: question.into(),
            answer: answer.into(),
            results,
            timestamp: timestamp.into(),
        }
    }

    /// Creates an entry stamped with the current UTC time.
    pub fn stamped_now<Q, A>(question: Q, answer: A, results: Vec<SearchResult>) -> Self
    where
        Q: Into<String>,
        A: Into<String>,
    {
        Self::new(question, answer, results, current_timestamp())
    }

    /// Question as originally typed.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Answer text.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Cited search results.
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// Creation timestamp.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Question folded for exact-match comparison.
    pub fn normalized_question(&self) -> String {
        normalize_question(&self.question)
    }
}

/// Current UTC time with a fixed-width fractional part, so stamps from the
/// same writer sort lexicographically.
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_stamped_now_is_rfc3339() {
        let entry = CachedEntry::stamped_now("What is Go?", "A language [1]", Vec::new());
        DateTime::parse_from_rfc3339(entry.timestamp()).unwrap();
        assert!(entry.timestamp().ends_with('Z'));
    }

    #[test]
    fn test_question_stored_verbatim() {
        let entry = CachedEntry::new("  What IS  Go? ", "answer", Vec::new(), "t");
        assert_eq!(entry.question(), "  What IS  Go? ");
        assert_eq!(entry.normalized_question(), "what is go?");
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = r#"{"question":"q","answer":"a","timestamp":"t"}"#;
        serde_json::from_str::<CachedEntry>(json).unwrap_err();
    }

    #[test]
    fn test_durable_field_names() {
        let entry = CachedEntry::new(
            "q",
            "a [1]",
            vec![SearchResult::new("title", "https://x", "snippet")],
            "2026-01-01T00:00:00.000000Z",
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["question"], "q");
        assert_eq!(value["results"][0]["url"], "https://x");
        assert_eq!(value["timestamp"], "2026-01-01T00:00:00.000000Z");
    }
}
