//! Textual similarity between questions.
//!
//! Scores are computed over normalized text (lowercased, whitespace runs
//! collapsed) and always satisfy:
//!
//! * `similarity(a, a) == 1.0`
//! * `similarity(a, b) == similarity(b, a)`
//! * `similarity("", "") == 1.0` and `similarity("x", "") == 0.0`
//!
//! The concrete metric sits behind [`SimilarityMetric`] so it can be swapped
//! without touching the cache service.

use core::mem;

use crate::entry::CachedEntry;

/// Threshold above which a rephrased question reuses a cached answer.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// A similarity measure over two normalized, non-empty strings.
pub trait SimilarityMetric: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Score in `0.0..=1.0` for two normalized strings.
    ///
    /// Callers handle the empty-string cases and normalization; implementations
    /// must be symmetric and return `1.0` for identical input.
    fn ratio(&self, left: &[char], right: &[char]) -> f64;
}

/// Ratcliff/Obershelp "gestalt" matching ratio: `2 * M / T`, where `M` counts
/// characters in recursively found longest common blocks and `T` is the total
/// length of both strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestaltRatio;

impl SimilarityMetric for GestaltRatio {
    fn name(&self) -> &'static str {
        "gestalt"
    }

    fn ratio(&self, left: &[char], right: &[char]) -> f64 {
        let total = left.len() + right.len();
        if total == 0 {
            return 1.0;
        }
        // Block search breaks ties by position, so fix the argument order.
        let (first, second) = if left <= right {
            (left, right)
        } else {
            (right, left)
        };
        let matched = matching_characters(first, second);
        (2 * matched) as f64 / total as f64
    }
}

/// `1 - distance / longest`, with `distance` the Levenshtein edit distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl SimilarityMetric for NormalizedLevenshtein {
    fn name(&self) -> &'static str {
        "levenshtein"
    }

    fn ratio(&self, left: &[char], right: &[char]) -> f64 {
        let longest = left.len().max(right.len());
        if longest == 0 {
            return 1.0;
        }
        1.0 - levenshtein(left, right) as f64 / longest as f64
    }
}

/// Lowercases and collapses every whitespace run into a single space.
pub fn normalize_question(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity of two questions using the default gestalt metric.
pub fn similarity(left: &str, right: &str) -> f64 {
    similarity_with(&GestaltRatio, left, right)
}

/// Similarity of two questions using `metric`.
pub fn similarity_with(metric: &dyn SimilarityMetric, left: &str, right: &str) -> f64 {
    let left_chars: Vec<char> = normalize_question(left).chars().collect();
    let right_chars: Vec<char> = normalize_question(right).chars().collect();
    score_normalized(metric, &left_chars, &right_chars)
}

fn score_normalized(metric: &dyn SimilarityMetric, left: &[char], right: &[char]) -> f64 {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) if left == right => 1.0,
        (false, false) => metric.ratio(left, right).clamp(0.0, 1.0),
    }
}

/// Scores every entry against `query`, keeps those scoring at least
/// `min_similarity`, and returns the best `max_results`, highest first.
///
/// Equal scores keep insertion order.
pub fn rank<'entries>(
    metric: &dyn SimilarityMetric,
    query: &str,
    entries: &'entries [CachedEntry],
    min_similarity: f64,
    max_results: usize,
) -> Vec<(&'entries CachedEntry, f64)> {
    let query_chars: Vec<char> = normalize_question(query).chars().collect();

    let mut scored: Vec<(&CachedEntry, f64)> = entries
        .iter()
        .map(|entry| {
            let question: Vec<char> = entry.normalized_question().chars().collect();
            (entry, score_normalized(metric, &query_chars, &question))
        })
        .filter(|(_, score)| *score >= min_similarity)
        .collect();

    // `sort_by` is stable.
    scored.sort_by(|left, right| right.1.total_cmp(&left.1));
    scored.truncate(max_results);
    scored
}

/// Total length of the matching blocks between `first` and `second`.
fn matching_characters(first: &[char], second: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, first.len(), 0, second.len())];

    while let Some((first_lo, first_hi, second_lo, second_hi)) = pending.pop() {
        let (first_start, second_start, length) =
            longest_common_block(&first[first_lo..first_hi], &second[second_lo..second_hi]);
        if length == 0 {
            continue;
        }
        matched += length;

        let first_at = first_lo + first_start;
        let second_at = second_lo + second_start;
        pending.push((first_lo, first_at, second_lo, second_at));
        pending.push((first_at + length, first_hi, second_at + length, second_hi));
    }

    matched
}

/// Longest common contiguous block as `(start_in_first, start_in_second, len)`.
///
/// The earliest block in `first` wins ties, then the earliest in `second`.
fn longest_common_block(first: &[char], second: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut previous = vec![0_usize; second.len() + 1];
    let mut current = vec![0_usize; second.len() + 1];

    for (first_index, first_char) in first.iter().enumerate() {
        for (second_index, second_char) in second.iter().enumerate() {
            current[second_index + 1] = if first_char == second_char {
                let run = previous[second_index] + 1;
                if run > best.2 {
                    best = (first_index + 1 - run, second_index + 1 - run, run);
                }
                run
            } else {
                0
            };
        }
        mem::swap(&mut previous, &mut current);
    }

    best
}

fn levenshtein(left: &[char], right: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=right.len()).collect();
    let mut current = vec![0_usize; right.len() + 1];

    for (left_index, left_char) in left.iter().enumerate() {
        current[0] = left_index + 1;
        for (right_index, right_char) in right.iter().enumerate() {
            let substitution = previous[right_index] + usize::from(left_char != right_char);
            let deletion = previous[right_index + 1] + 1;
            let insertion = current[right_index] + 1;
            current[right_index + 1] = substitution.min(deletion).min(insertion);
        }
        mem::swap(&mut previous, &mut current);
    }

    previous[right.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "x",
        "What is Go?",
        "what is go?",
        "What is the capital of France?",
        "capital of France",
        "How tall is Mount Everest",
        "aaaa",
        "abab",
        "  spaced    out\tquestion ",
    ];

    fn entry(question: &str) -> CachedEntry {
        CachedEntry::new(question, "answer", Vec::new(), "2026-01-01T00:00:00.000000Z")
    }

    #[test]
    fn test_normalize_question() {
        assert_eq!(normalize_question("  What\tIS \n Go? "), "what is go?");
        assert_eq!(normalize_question(""), "");
        assert_eq!(normalize_question("   "), "");
    }

    #[test]
    fn test_reflexive() {
        for sample in SAMPLES {
            assert!((similarity(sample, sample) - 1.0).abs() < f64::EPSILON);
            let levenshtein = similarity_with(&NormalizedLevenshtein, sample, sample);
            assert!((levenshtein - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_symmetric() {
        let metrics: [&dyn SimilarityMetric; 2] = [&GestaltRatio, &NormalizedLevenshtein];
        for metric in metrics {
            for left in SAMPLES {
                for right in SAMPLES {
                    let forward = similarity_with(metric, left, right);
                    let backward = similarity_with(metric, right, left);
                    assert!(
                        (forward - backward).abs() < f64::EPSILON,
                        "{} not symmetric for {left:?} / {right:?}",
                        metric.name()
                    );
                }
            }
        }
    }

    #[test]
    fn test_empty_strings() {
        assert!((similarity("", "") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("x", "").abs() < f64::EPSILON);
        assert!(similarity("", "x").abs() < f64::EPSILON);
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert!((similarity("What is Go?", "  what   IS go? ") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scores_within_unit_interval() {
        for left in SAMPLES {
            for right in SAMPLES {
                let score = similarity(left, right);
                assert!((0.0..=1.0).contains(&score));
            }
        }
    }

    #[test]
    fn test_gestalt_known_values() {
        // "capital of france" (17) is one block inside the 30-char question.
        let score = similarity("What is the capital of France?", "capital of France");
        assert!((score - 34.0 / 47.0).abs() < 1e-12);

        // "abcd" vs "bcde": block "bcd" -> 2 * 3 / 8.
        assert!((similarity("abcd", "bcde") - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_levenshtein_known_values() {
        let score = similarity_with(&NormalizedLevenshtein, "kitten", "sitting");
        assert!((score - (1.0 - 3.0 / 7.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rank_filters_sorts_and_truncates() {
        let entries = vec![
            entry("How tall is Mount Everest"),
            entry("What is the capital of France?"),
            entry("What is the capital of Spain?"),
            entry("what is the capital of france?"),
        ];

        let ranked = rank(&GestaltRatio, "What is the capital of France?", &entries, 0.8, 10);
        let questions: Vec<&str> = ranked.iter().map(|(found, _)| found.question()).collect();
        assert_eq!(
            questions,
            vec![
                "What is the capital of France?",
                "what is the capital of france?",
                "What is the capital of Spain?",
            ]
        );
        assert!(ranked.windows(2).all(|pair| pair[0].1 >= pair[1].1));

        let top = rank(&GestaltRatio, "What is the capital of France?", &entries, 0.8, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].0.question(), "What is the capital of France?");
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        let entries = vec![entry("Same question"), entry("same   QUESTION"), entry("same question")];
        let ranked = rank(&GestaltRatio, "same question", &entries, 0.5, 3);
        let questions: Vec<&str> = ranked.iter().map(|(found, _)| found.question()).collect();
        assert_eq!(questions, vec!["Same question", "same   QUESTION", "same question"]);
    }

    #[test]
    fn test_rank_empty_collection_and_no_match() {
        assert!(rank(&GestaltRatio, "anything", &[], 0.0, 5).is_empty());

        let entries = vec![entry("How tall is Mount Everest")];
        assert!(rank(&GestaltRatio, "zzzz", &entries, 0.9, 5).is_empty());
    }
}
