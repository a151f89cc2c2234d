use std::time::{Duration, Instant};

use async_trait::async_trait;
use inquisitor_core::config::ENV_SERPAPI_KEY;
use inquisitor_core::{Error, Result, SearchConfig, SearchProvider, SearchResult};
use reqwest::Client;
use serde::Deserialize;

/// `SerpAPI` search endpoint URL.
const SERPAPI_URL: &str = "https://serpapi.com/search";

/// Google web search through `SerpAPI`.
pub struct SerpApiSearch {
    /// HTTP client for API requests.
    client: Client,
    /// `SerpAPI` key; searches fail until one is set.
    api_key: Option<String>,
    /// Endpoint URL.
    base_url: String,
    /// Country code (`gl`).
    country: String,
    /// Language code (`hl`).
    language: String,
}

impl SerpApiSearch {
    /// Creates a search provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.is_empty()),
            base_url: SERPAPI_URL.to_owned(),
            country: config.country.clone(),
            language: config.language.clone(),
        })
    }

    /// Points the provider at a different endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

/// Top-level `SerpAPI` response; only organic results are used.
#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    /// Ranked organic results.
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    /// Error message reported by `SerpAPI`.
    #[serde(default)]
    error: Option<String>,
}

/// One organic result; any field may be missing.
#[derive(Debug, Deserialize)]
struct OrganicResult {
    /// Result title.
    #[serde(default)]
    title: String,
    /// Result URL.
    #[serde(default)]
    link: String,
    /// Result excerpt.
    #[serde(default)]
    snippet: String,
}

/// Keeps complete results only, in rank order, at most `count` of them.
fn collect_results(response: SerpApiResponse, count: usize) -> Vec<SearchResult> {
    response
        .organic_results
        .into_iter()
        .take(count)
        .filter(|result| {
            !result.title.is_empty() && !result.link.is_empty() && !result.snippet.is_empty()
        })
        .map(|result| SearchResult::new(result.title, result.link, result.snippet))
        .collect()
}

#[async_trait]
impl SearchProvider for SerpApiSearch {
    fn name(&self) -> &'static str {
        "SerpAPI"
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::MissingApiKey(ENV_SERPAPI_KEY.to_owned()))?;
        let start = Instant::now();
        let num = count.to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("engine", "google"),
                ("api_key", api_key),
                ("num", num.as_str()),
                ("gl", self.country.as_str()),
                ("hl", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(|err| Error::Provider(format!("Search request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(Error::Provider(format!(
                "SerpAPI error {status}: {error_text}"
            )));
        }

        let payload: SerpApiResponse = response
            .json()
            .await
            .map_err(|err| Error::InvalidResponse(format!("Failed to parse SerpAPI response: {err}")))?;

        if let Some(message) = payload.error.clone() {
            return Err(Error::Provider(format!("SerpAPI error: {message}")));
        }

        let results = collect_results(payload, count);
        tracing::debug!(
            query,
            results = results.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "search completed"
        );
        Ok(results)
    }
}
