//! Answer types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerMode {
    /// Generated by the language model from retrieved context
    #[serde(rename = "synthesized")]
    Synthesized,

    /// Top retrieved chunk, no synthesizer configured
    #[serde(rename = "retrieval")]
    RetrievalOnly,

    /// Top retrieved chunk after the synthesizer failed
    #[serde(rename = "retrieval (synthesis failed)")]
    RetrievalFallback,
}

impl AnswerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerMode::Synthesized => "synthesized",
            AnswerMode::RetrievalOnly => "retrieval",
            AnswerMode::RetrievalFallback => "retrieval (synthesis failed)",
        }
    }
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer to a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text
    pub answer: String,

    /// Filename of the best-matching chunk
    pub source: Option<String>,

    /// Similarity of the best-matching chunk, rounded to 4 decimals
    pub similarity: f32,

    pub mode: AnswerMode,

    /// Filenames of the chunks passed as context, best first
    #[serde(default)]
    pub sources_used: Vec<String>,
}

/// Answer text returned when retrieval finds nothing.
pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found in the documents.";

impl Answer {
    pub fn no_information() -> Self {
        Self {
            answer: NO_RELEVANT_INFORMATION.to_string(),
            source: None,
            similarity: 0.0,
            mode: AnswerMode::RetrievalOnly,
            sources_used: Vec::new(),
        }
    }
}
