//! LLM provider identification.

/// Default Gemini REST base URL.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Ollama base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Gemini,
    Ollama,
}

impl ProviderType {
    pub const ALL: [ProviderType; 2] = [Self::Gemini, Self::Ollama];

    /// Parse a canonical provider name, as accepted by configuration.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gemini" => Some(Self::Gemini),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        }
    }

    /// Human-readable provider label for status output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Google Gemini",
            Self::Ollama => "Ollama",
        }
    }

    /// Base URL used when none is configured.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_GEMINI_URL,
            Self::Ollama => DEFAULT_OLLAMA_URL,
        }
    }

    /// Whether the provider needs an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Gemini)
    }
}
