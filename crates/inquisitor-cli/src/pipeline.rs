//! Answers a question from the cache when possible, otherwise by searching the
//! web and synthesizing a cited answer that is then cached.

use anyhow::{Context as _, Result, bail};
use inquisitor_cache::{CacheBackend, CacheService, DEFAULT_SIMILARITY_THRESHOLD, JsonFileBackend};
use inquisitor_core::{SearchProvider, SearchResult, Synthesizer};

use crate::citations::dangling_citations;

/// Default number of search results requested per question.
pub const DEFAULT_NUM_RESULTS: usize = 8;

/// Where an answer came from.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerSource {
    /// A cached entry with the same question
    Exact,
    /// A cached entry for a rephrased question
    Similar {
        /// The cached question that matched
        question: String,
        /// Similarity between the two questions
        score: f64,
    },
    /// A new search and synthesis
    Fresh,
}

/// A complete answer with the sources it cites.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The question as asked
    pub question: String,
    /// Answer text with inline `[k]` citations
    pub text: String,
    /// Sources, numbered from 1 in the citations
    pub results: Vec<SearchResult>,
    /// Where the answer came from
    pub source: AnswerSource,
    /// Non-fatal cache problems met while answering
    pub notices: Vec<String>,
}

/// Cache-first question answering.
pub struct Inquisitor<B = JsonFileBackend> {
    cache: Option<CacheService<B>>,
    search: Box<dyn SearchProvider>,
    synthesizer: Box<dyn Synthesizer>,
    num_results: usize,
    similarity_threshold: f64,
}

impl<B: CacheBackend> Inquisitor<B> {
    /// Creates a pipeline; `cache` of `None` always searches and never stores.
    pub fn new(
        cache: Option<CacheService<B>>,
        search: Box<dyn SearchProvider>,
        synthesizer: Box<dyn Synthesizer>,
    ) -> Self {
        Self {
            cache,
            search,
            synthesizer,
            num_results: DEFAULT_NUM_RESULTS,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Sets how many search results are requested.
    #[must_use]
    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results;
        self
    }

    /// Sets the minimum similarity for a rephrased question to be reused.
    #[must_use]
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// The cache, unless caching is disabled.
    pub fn cache_mut(&mut self) -> Option<&mut CacheService<B>> {
        self.cache.as_mut()
    }

    /// Answers `question`.
    ///
    /// Cache failures never fail the answer; they are reported in
    /// [`Answer::notices`].
    ///
    /// # Errors
    /// Returns an error if the question is blank, the search fails or finds
    /// nothing, or synthesis fails
    pub async fn answer(&mut self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            bail!("Question must not be empty");
        }
        let mut notices = Vec::new();

        if let Some(cache) = self.cache.as_mut() {
            if let Some(warning) = cache.take_load_warning() {
                notices.push(format!("Cache could not be read, starting empty: {warning}"));
            }

            if let Some(entry) = cache.find_exact_match(question) {
                return Ok(Answer {
                    question: question.to_owned(),
                    text: entry.answer().to_owned(),
                    results: entry.results().to_vec(),
                    source: AnswerSource::Exact,
                    notices,
                });
            }

            match cache.find_similar_questions(question, self.similarity_threshold, 1) {
                Ok(matches) => {
                    if let Some(best) = matches.into_iter().next() {
                        return Ok(Answer {
                            question: question.to_owned(),
                            text: best.entry.answer().to_owned(),
                            results: best.entry.results().to_vec(),
                            source: AnswerSource::Similar {
                                question: best.entry.question().to_owned(),
                                score: best.score,
                            },
                            notices,
                        });
                    }
                }
                Err(error) => notices.push(format!("Similar question lookup failed: {error}")),
            }
        }

        let results = self
            .search
            .search(question, self.num_results)
            .await
            .with_context(|| format!("{} search failed", self.search.name()))?;
        if results.is_empty() {
            bail!("No search results found");
        }
        tracing::info!(
            provider = self.search.name(),
            results = results.len(),
            "search results received"
        );

        let answer = self
            .synthesizer
            .synthesize(question, &results)
            .await
            .with_context(|| format!("{} synthesis failed", self.synthesizer.name()))?;

        let dangling = dangling_citations(&answer, results.len());
        if !dangling.is_empty() {
            tracing::warn!(?dangling, "answer cites sources that were not provided");
        }

        if let Some(cache) = self.cache.as_mut()
            && let Err(error) = cache.store_qa(question, &answer, results.clone())
        {
            notices.push(format!("Answer could not be cached: {error}"));
        }

        Ok(Answer {
            question: question.to_owned(),
            text: answer,
            results,
            source: AnswerSource::Fresh,
            notices,
        })
    }
}
