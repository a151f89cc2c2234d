//! Search and synthesis adapters for external services.

/// Scripted collaborators for tests.
pub mod mock;
/// `OpenAI`-compatible chat completion synthesizer.
pub mod openai;
/// `SerpAPI` Google search provider.
pub mod serpapi;

pub use mock::{MockSearch, MockSynthesizer};
pub use openai::OpenAiSynthesizer;
pub use serpapi::SerpApiSearch;
