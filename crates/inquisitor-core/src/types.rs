use core::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// One search hit returned by a search provider.
///
/// The position of a result within its list is significant: answers cite
/// results with 1-based `[k]` markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title.
    pub title: String,
    /// Page URL.
    pub url: String,
    /// Short excerpt shown by the search engine.
    pub snippet: String,
}

impl SearchResult {
    /// Creates a new search result.
    pub fn new<T, U, S>(title: T, url: U, snippet: S) -> Self
    where
        T: Into<String>,
        U: Into<String>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// Renders results as the numbered block handed to the synthesizer.
///
/// Numbering starts at 1 so the `[k]` markers in the answer line up with
/// the positions in `results`.
#[must_use]
pub fn format_results_for_prompt(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No search results found.".to_owned();
    }

    let mut formatted = String::from("Search Results:\n\n");
    for (index, result) in results.iter().enumerate() {
        // Writing into a String cannot fail.
        let _ignored = write!(
            formatted,
            "[{number}] Title: {title}\nURL: {url}\nContent: {snippet}\n\n",
            number = index + 1,
            title = result.title,
            url = result.url,
            snippet = result.snippet,
        );
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_results_numbering() {
        let results = vec![
            SearchResult::new("Paris", "https://a.example", "Paris is the capital"),
            SearchResult::new("France", "https://b.example", "France is in Europe"),
        ];

        let formatted = format_results_for_prompt(&results);
        assert!(formatted.starts_with("Search Results:"));
        assert!(formatted.contains("[1] Title: Paris"));
        assert!(formatted.contains("[2] Title: France"));
        assert!(formatted.contains("URL: https://b.example"));
    }

    #[test]
    fn test_format_results_empty() {
        assert_eq!(format_results_for_prompt(&[]), "No search results found.");
    }

    #[test]
    fn test_search_result_serde_field_names() {
        let result = SearchResult::new("t", "u", "s");
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"title":"t","url":"u","snippet":"s"}"#);
    }
}
