//! Terminal rendering for answers, sources and cache views.
//!
//! Every renderer returns a `String`; callers decide where to write it.

use std::path::Path;

use console::{StyledObject, style};
use inquisitor_cache::{CacheStats, CachedEntry, ScoredEntry};
use inquisitor_core::SearchResult;
use regex::Captures;

use crate::citations::CITATION_REGEX;
use crate::pipeline::AnswerSource;

/// Width of the header rules and separators.
const RULE_WIDTH: usize = 50;
/// Characters of an answer shown in cache listings.
const PREVIEW_CHARS: usize = 100;

/// Renders output with or without ANSI colors.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    use_colors: bool,
}

impl OutputFormatter {
    /// Creates a formatter; with `use_colors` off the output is plain text.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn paint<D>(&self, value: D) -> StyledObject<D> {
        let styled = style(value);
        if self.use_colors {
            styled
        } else {
            styled.force_styling(false)
        }
    }

    /// Header, highlighted answer and numbered sources.
    pub fn format_response(&self, answer: &str, results: &[SearchResult]) -> String {
        let mut output = vec![
            self.format_header("Inquisitor Answer"),
            String::new(),
            self.format_answer(answer),
            String::new(),
        ];

        if !results.is_empty() {
            output.push(self.paint("Sources:").magenta().bold().to_string());
            output.push(String::new());
            for (index, result) in results.iter().enumerate() {
                output.push(self.format_source(index + 1, result));
                output.push(String::new());
            }
        }
        output.join("\n")
    }

    /// Title centered between two rules.
    pub fn format_header(&self, title: &str) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        self.paint(format!("{rule}\n{title:^RULE_WIDTH$}\n{rule}"))
            .cyan()
            .bold()
            .to_string()
    }

    /// Answer text with `[k]` markers highlighted.
    pub fn format_answer(&self, answer: &str) -> String {
        if !self.use_colors {
            return answer.to_owned();
        }
        CITATION_REGEX
            .replace_all(answer, |captures: &Captures<'_>| {
                self.paint(&captures[0]).blue().to_string()
            })
            .into_owned()
    }

    /// One numbered source: title, then indented URL and snippet.
    pub fn format_source(&self, number: usize, result: &SearchResult) -> String {
        format!(
            "{} {}\n    {}\n    {}",
            self.paint(format!("[{number}]")).blue(),
            self.paint(&result.title).white().bold(),
            self.paint(&result.url).cyan(),
            self.paint(&result.snippet).white(),
        )
    }

    /// Error line.
    pub fn format_error(&self, message: &str) -> String {
        self.paint(format!("Error: {message}")).red().to_string()
    }

    /// Progress line.
    pub fn format_status(&self, message: &str) -> String {
        self.paint(format!("⏳ {message}...")).yellow().to_string()
    }

    /// Completion line.
    pub fn format_success(&self, message: &str) -> String {
        self.paint(format!("✓ {message}")).green().to_string()
    }

    /// Informational line.
    pub fn format_info(&self, message: &str) -> String {
        self.paint(format!("ℹ {message}")).cyan().to_string()
    }

    /// Non-fatal problem line.
    pub fn format_warning(&self, message: &str) -> String {
        self.paint(format!("⚠ {message}")).yellow().to_string()
    }

    /// Rule between answers in interactive mode.
    pub fn format_separator(&self) -> String {
        self.paint("─".repeat(RULE_WIDTH)).dim().to_string()
    }

    /// Where a cached answer came from, or `None` for a fresh one.
    pub fn format_answer_source(&self, source: &AnswerSource) -> Option<String> {
        match source {
            AnswerSource::Exact => Some(self.format_info("Answer found in cache")),
            AnswerSource::Similar { question, score } => Some(self.format_info(&format!(
                "Similar question found in cache ({:.0}% match): {question}",
                score * 100.0
            ))),
            AnswerSource::Fresh => None,
        }
    }

    /// Most recent entries, newest first.
    pub fn format_recent(&self, entries: &[CachedEntry]) -> String {
        if entries.is_empty() {
            return self.format_info("The cache is empty");
        }
        let mut output = vec![self.format_header("Recent Questions"), String::new()];
        for (index, entry) in entries.iter().enumerate() {
            output.push(self.format_listing(index + 1, entry, None));
        }
        output.join("\n")
    }

    /// Cached questions similar to a query, best first.
    pub fn format_similar(&self, term: &str, matches: &[ScoredEntry]) -> String {
        if matches.is_empty() {
            return self.format_info(&format!("No cached questions similar to \"{term}\""));
        }
        let mut output = vec![self.format_header("Similar Questions"), String::new()];
        for (index, scored) in matches.iter().enumerate() {
            output.push(self.format_listing(index + 1, &scored.entry, Some(scored.score)));
        }
        output.join("\n")
    }

    /// Cached entries mentioning a term.
    pub fn format_search_hits(&self, term: &str, entries: &[CachedEntry]) -> String {
        if entries.is_empty() {
            return self.format_info(&format!("No cached entries mention \"{term}\""));
        }
        let mut output = vec![self.format_header("Cache Search"), String::new()];
        for (index, entry) in entries.iter().enumerate() {
            output.push(self.format_listing(index + 1, entry, None));
        }
        output.join("\n")
    }

    /// Entry count, size and timestamp range of the cache at `path`.
    pub fn format_stats(&self, stats: &CacheStats, path: &Path) -> String {
        [
            self.format_header("Cache Statistics"),
            String::new(),
            format!("  Location: {}", path.display()),
            format!("  Entries:  {}", stats.total_entries),
            format!("  Size:     {:.2} MB", stats.cache_size_mb()),
            format!(
                "  Oldest:   {}",
                stats.oldest_entry_timestamp.as_deref().unwrap_or("-")
            ),
            format!(
                "  Newest:   {}",
                stats.newest_entry_timestamp.as_deref().unwrap_or("-")
            ),
        ]
        .join("\n")
    }

    fn format_listing(&self, number: usize, entry: &CachedEntry, score: Option<f64>) -> String {
        let score = score
            .map(|value| format!(" ({:.0}%)", value * 100.0))
            .unwrap_or_default();
        format!(
            "{} {}{}\n    {}\n    {}\n",
            self.paint(format!("[{number}]")).blue(),
            self.paint(entry.question()).white().bold(),
            self.paint(score).green(),
            self.paint(entry.timestamp()).dim(),
            preview(entry.answer(), PREVIEW_CHARS),
        )
    }
}

/// First `max_chars` characters of `text` on one line, with an ellipsis if cut.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> OutputFormatter {
        OutputFormatter::new(false)
    }

    fn entry(question: &str, answer: &str) -> CachedEntry {
        CachedEntry::new(question, answer, Vec::new(), "2026-10-19T12:00:00.000000Z")
    }

    #[test]
    fn test_response_lists_sources() {
        let results = vec![
            SearchResult::new("Paris", "https://a.example", "Capital of France"),
            SearchResult::new("France", "https://b.example", "Country in Europe"),
        ];
        let output = plain().format_response("Paris [1] is in France [2].", &results);

        assert!(output.starts_with(&"=".repeat(RULE_WIDTH)));
        assert!(output.contains("Inquisitor Answer"));
        assert!(output.contains("Paris [1] is in France [2]."));
        assert!(output.contains("Sources:"));
        assert!(output.contains("[1] Paris\n    https://a.example\n    Capital of France"));
        assert!(output.contains("[2] France\n    https://b.example\n    Country in Europe"));
    }

    #[test]
    fn test_response_without_sources() {
        let output = plain().format_response("Nothing found.", &[]);
        assert!(!output.contains("Sources:"));
    }

    #[test]
    fn test_header_is_centered() {
        let header = plain().format_header("Title");
        let lines: Vec<&str> = header.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].len(), RULE_WIDTH);
        assert_eq!(lines[1].trim(), "Title");
    }

    #[test]
    fn test_plain_message_prefixes() {
        let formatter = plain();
        assert_eq!(formatter.format_error("boom"), "Error: boom");
        assert_eq!(formatter.format_status("Searching the web"), "⏳ Searching the web...");
        assert_eq!(formatter.format_success("Done"), "✓ Done");
        assert_eq!(formatter.format_info("Note"), "ℹ Note");
    }

    #[test]
    fn test_colored_answer_keeps_citation_text() {
        let formatted = OutputFormatter::new(true).format_answer("Paris [1].");
        assert!(formatted.contains("[1]"));
        assert!(formatted.starts_with("Paris "));
    }

    #[test]
    fn test_answer_source_messages() {
        let formatter = plain();
        assert_eq!(
            formatter.format_answer_source(&AnswerSource::Exact).unwrap(),
            "ℹ Answer found in cache"
        );
        let similar = AnswerSource::Similar {
            question: "capital of France?".to_owned(),
            score: 0.934,
        };
        assert_eq!(
            formatter.format_answer_source(&similar).unwrap(),
            "ℹ Similar question found in cache (93% match): capital of France?"
        );
        assert!(formatter.format_answer_source(&AnswerSource::Fresh).is_none());
    }

    #[test]
    fn test_recent_listing() {
        let output = plain().format_recent(&[entry("Second?", "Two."), entry("First?", "One.")]);
        assert!(output.contains("[1] Second?"));
        assert!(output.contains("[2] First?"));
        assert!(output.contains("2026-10-19T12:00:00.000000Z"));
        assert_eq!(plain().format_recent(&[]), "ℹ The cache is empty");
    }

    #[test]
    fn test_similar_listing_shows_score() {
        let matches = vec![ScoredEntry {
            entry: entry("capital of France?", "Paris."),
            score: 0.9,
        }];
        let output = plain().format_similar("capital France", &matches);
        assert!(output.contains("[1] capital of France? (90%)"));
    }

    #[test]
    fn test_stats_rendering() {
        let stats = CacheStats {
            total_entries: 2,
            cache_size_bytes: 1_048_576,
            oldest_entry_timestamp: Some("2026-01-01T00:00:00.000000Z".to_owned()),
            newest_entry_timestamp: None,
        };
        let output = plain().format_stats(&stats, Path::new("/tmp/qa_cache.json"));
        assert!(output.contains("Entries:  2"));
        assert!(output.contains("Size:     1.00 MB"));
        assert!(output.contains("Oldest:   2026-01-01T00:00:00.000000Z"));
        assert!(output.contains("Newest:   -"));
    }

    #[test]
    fn test_preview_truncates_on_chars() {
        assert_eq!(preview("short\n answer", 100), "short answer");
        assert_eq!(preview("ééééé", 3), "ééé...");
    }
}
