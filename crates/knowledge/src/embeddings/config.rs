//! Embedding configuration.

use knowqa_core::config::EmbeddingSettings;
use knowqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::EmbeddingProvider;

/// Embedding backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Base URL for HTTP providers
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Upper bound for a single embedding call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl From<&EmbeddingSettings> for EmbeddingConfig {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
            endpoint: settings.endpoint.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// The embedding space this configuration produces vectors in.
    pub fn signature(&self) -> EmbeddingSignature {
        EmbeddingSignature::new(&self.provider, &self.model, self.dimensions)
    }
}

/// Identity of an embedding space: vectors are only comparable when all
/// three fields agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingSignature {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
}

impl EmbeddingSignature {
    pub fn new(provider: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            dimensions,
        }
    }

    /// Signature of a live provider.
    pub fn of(provider: &dyn EmbeddingProvider) -> Self {
        Self::new(
            provider.provider_name(),
            provider.model_name(),
            provider.dimensions(),
        )
    }

    /// Check that vectors built under `other` can be searched with `self`.
    ///
    /// `self` is the configured embedder, `other` the one recorded with a
    /// persisted index.
    pub fn validate_consistency(&self, other: &Self) -> AppResult<()> {
        if self.dimensions != other.dimensions {
            return Err(AppError::DimensionMismatch {
                expected: self.dimensions,
                found: other.dimensions,
            });
        }

        if self.provider != other.provider || self.model != other.model {
            return Err(AppError::EmbeddingModelMismatch {
                expected: self.to_string(),
                found: other.to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for EmbeddingSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}
