use std::time::Instant;

use async_trait::async_trait;
use inquisitor_core::config::ENV_OPENAI_API_KEY;
use inquisitor_core::{
    Error, LlmConfig, Result, SearchResult, Synthesizer, format_results_for_prompt,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Answer returned when there is nothing to synthesize from.
pub const NO_RESULTS_ANSWER: &str = "No search results available to synthesize an answer.";

/// System prompt asking for cited answers.
const SYSTEM_PROMPT: &str = "You are an expert research assistant that synthesizes information from web search results into clear, accurate answers with proper citations.

Your task is to:
1. Analyze the provided search results
2. Create a comprehensive, well-structured answer to the user's question
3. Include inline citations using square brackets with numbers [1], [2], etc.
4. Only cite information that directly comes from the search results
5. If information conflicts between sources, acknowledge this
6. Be concise but thorough
7. Use a conversational, informative tone

IMPORTANT: Always include citations for factual claims. Use the exact numbering from the search results provided.";

/// Synthesizer backed by an `OpenAI`-compatible chat completions API.
pub struct OpenAiSynthesizer {
    /// HTTP client for API requests.
    client: Client,
    /// API key; synthesis fails until one is set.
    api_key: Option<String>,
    /// Chat completions endpoint.
    base_url: String,
    /// Model name to use.
    model: String,
    /// Sampling temperature.
    temperature: f32,
    /// Maximum number of tokens in the answer.
    max_tokens: usize,
}

impl OpenAiSynthesizer {
    /// Creates a synthesizer from configuration.
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Self {
        Self {
            client: Client::default(),
            api_key: api_key.filter(|key| !key.is_empty()),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Builds the user message: the question followed by numbered results.
    fn build_user_prompt(query: &str, results: &[SearchResult]) -> String {
        let results_text = format_results_for_prompt(results);
        format!(
            "User Question: {query}\n\n{results_text}\n\nPlease provide a comprehensive answer to the user's question based on the search results above. Include inline citations using square brackets [1], [2], etc. that correspond to the numbered search results. Only include information that can be found in the provided search results."
        )
    }
}

/// Request payload sent to the chat completion API.
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// Model identifier.
    model: String,
    /// System and user messages.
    messages: Vec<ChatMessage>,
    /// Sampling temperature controlling response randomness.
    temperature: f32,
    /// Maximum number of tokens allowed in the completion.
    max_tokens: usize,
}

/// Message delivered to the API.
#[derive(Debug, Serialize)]
struct ChatMessage {
    /// Role of the message author (`system` or `user`).
    role: &'static str,
    /// Textual content of the message.
    content: String,
}

/// Response payload returned by the API.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// List of candidate completions.
    choices: Vec<ChatChoice>,
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// Message generated for the choice.
    message: ChatResponseMessage,
}

/// Response message containing the generated text.
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    /// Generated text content.
    #[serde(default)]
    content: Option<String>,
}

/// First non-empty answer in the response, trimmed.
fn extract_answer(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .find_map(|choice| choice.message.content)
        .map(|content| content.trim().to_owned())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| Error::InvalidResponse("No answer in chat completion".to_owned()))
}

#[async_trait]
impl Synthesizer for OpenAiSynthesizer {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    async fn synthesize(&self, query: &str, results: &[SearchResult]) -> Result<String> {
        if results.is_empty() {
            return Ok(NO_RESULTS_ANSWER.to_owned());
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::MissingApiKey(ENV_OPENAI_API_KEY.to_owned()))?;
        let start = Instant::now();

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_owned(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::build_user_prompt(query, results),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| Error::Provider(format!("LLM synthesis request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(Error::Provider(format!(
                "OpenAI API error {status}: {error_text}"
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|err| Error::InvalidResponse(format!("Failed to parse OpenAI response: {err}")))?;

        let answer = extract_answer(chat_response)?;
        tracing::debug!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            "answer synthesized"
        );
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::from_str;

    fn synthesizer(api_key: Option<&str>) -> OpenAiSynthesizer {
        OpenAiSynthesizer::new(&LlmConfig::default(), api_key.map(str::to_owned))
    }

    #[test]
    fn user_prompt_numbers_results() {
        let results = vec![
            SearchResult::new("Paris", "https://x", "Paris is the capital"),
            SearchResult::new("Lyon", "https://y", "Lyon is a city"),
        ];
        let prompt = OpenAiSynthesizer::build_user_prompt("Capital of France?", &results);

        assert!(prompt.starts_with("User Question: Capital of France?"));
        assert!(prompt.contains("[1] Title: Paris"));
        assert!(prompt.contains("[2] Title: Lyon"));
    }

    #[test]
    fn extract_answer_trims_content() {
        let response: ChatResponse =
            from_str(r#"{"choices": [{"message": {"role": "assistant", "content": "  Paris [1]\n"}}]}"#)
                .unwrap();
        assert_eq!(extract_answer(response).unwrap(), "Paris [1]");
    }

    #[test]
    fn extract_answer_rejects_empty_choices() {
        let response: ChatResponse = from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            extract_answer(response),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn empty_results_skip_the_request() {
        let answer = synthesizer(None).synthesize("anything", &[]).await.unwrap();
        assert_eq!(answer, NO_RESULTS_ANSWER);
    }

    #[tokio::test]
    async fn missing_key_fails_fast() {
        let provider = synthesizer(None);
        let results = vec![SearchResult::new("t", "u", "s")];
        let error = provider.synthesize("q", &results).await.unwrap_err();
        assert!(matches!(error, Error::MissingApiKey(_)));
    }

    #[tokio::test]
    async fn empty_key_counts_as_missing() {
        let results = vec![SearchResult::new("t", "u", "s")];
        let error = synthesizer(Some(""))
            .synthesize("q", &results)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::MissingApiKey(_)));
    }
}
