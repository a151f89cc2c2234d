//! Library interface for inquisitor-cli
//!
//! Exposes the answer pipeline and terminal formatting for the binary and
//! integration tests.

/// Citation marker parsing.
pub mod citations;
/// Terminal rendering of answers and cache views.
pub mod formatting;
/// Cache-first search and synthesis pipeline.
pub mod pipeline;

pub use formatting::OutputFormatter;
pub use pipeline::{Answer, AnswerSource, Inquisitor};
