//! Inline `[k]` citation markers in synthesized answers.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Matches `[k]` where `k` is a positive decimal number.
pub static CITATION_REGEX: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"\[(\d+)\]") {
    Ok(regex) => regex,
    Err(err) => panic!("Citation regex is invalid: {err}"),
});

/// Distinct 1-based result indices cited in `answer`, ascending.
pub fn cited_indices(answer: &str) -> Vec<usize> {
    CITATION_REGEX
        .captures_iter(answer)
        .filter_map(|captures| captures.get(1)?.as_str().parse().ok())
        .collect::<BTreeSet<usize>>()
        .into_iter()
        .collect()
}

/// Cited indices that do not refer to any of `result_count` results.
pub fn dangling_citations(answer: &str, result_count: usize) -> Vec<usize> {
    cited_indices(answer)
        .into_iter()
        .filter(|index| *index == 0 || *index > result_count)
        .collect()
}
