//! Answer synthesis through a language model.

use async_trait::async_trait;
use handlebars::Handlebars;
use knowqa_core::{AppConfig, AppError, AppResult};
use knowqa_llm::{create_client, LlmClient, LlmRequest, ProviderType};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const PROMPT_TEMPLATE: &str = "Based on the following information from the documents, answer the question.
Only use information from the provided context. If the answer is not in the context, say so.

Context from documents:
{{context}}

Question: {{question}}

Answer:";

/// Turns a question plus retrieved context into an answer.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Short description for status output, e.g. `gemini/gemini-2.5-flash`.
    fn describe(&self) -> String;

    async fn synthesize(&self, question: &str, context: &str) -> AppResult<String>;
}

#[derive(Serialize)]
struct PromptVars<'a> {
    context: &'a str,
    question: &'a str,
}

/// Render the synthesis prompt.
pub fn render_prompt(question: &str, context: &str) -> AppResult<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("answer", PROMPT_TEMPLATE)
        .map_err(|e| AppError::Synthesis(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("answer", &PromptVars { context, question })
        .map_err(|e| AppError::Synthesis(format!("Failed to render template: {}", e)))
}

/// [`AnswerSynthesizer`] backed by an [`LlmClient`].
pub struct LlmSynthesizer {
    client: Arc<dyn LlmClient>,
    model: String,
}

/// Whether the configured language model can be used for synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisStatus {
    /// Provider `none`.
    Disabled,
    /// The provider needs an API key and none is set.
    MissingApiKey(ProviderType),
    Ready(ProviderType),
}

impl SynthesisStatus {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        if config.llm.provider == "none" {
            return Ok(Self::Disabled);
        }

        let provider = ProviderType::parse(&config.llm.provider).ok_or_else(|| {
            AppError::Config(format!("Unknown LLM provider: {}", config.llm.provider))
        })?;
        let has_key = config
            .llm
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());

        if provider.requires_api_key() && !has_key {
            Ok(Self::MissingApiKey(provider))
        } else {
            Ok(Self::Ready(provider))
        }
    }

    pub fn provider(&self) -> Option<ProviderType> {
        match self {
            Self::Disabled => None,
            Self::MissingApiKey(p) | Self::Ready(p) => Some(*p),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::MissingApiKey(_) => "not configured",
            Self::Ready(_) => "configured",
        }
    }
}

impl LlmSynthesizer {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Build a synthesizer from configuration.
    ///
    /// Returns `Ok(None)` when synthesis is disabled or the provider lacks
    /// its API key; the caller then answers from retrieval alone.
    pub fn from_config(config: &AppConfig) -> AppResult<Option<Self>> {
        let status = SynthesisStatus::from_config(config)?;
        if !matches!(status, SynthesisStatus::Ready(_)) {
            tracing::debug!(
                "Answer synthesis unavailable (provider: {}, status: {})",
                config.llm.provider,
                status.as_str()
            );
            return Ok(None);
        }

        let client = create_client(
            &config.llm.provider,
            config.llm.endpoint.as_deref(),
            config.llm.api_key.as_deref(),
            Duration::from_secs(config.llm.timeout_secs.max(1)),
        )?;

        Ok(Some(Self::new(client, config.llm.model.clone())))
    }
}

#[async_trait]
impl AnswerSynthesizer for LlmSynthesizer {
    fn describe(&self) -> String {
        format!("{}/{}", self.client.provider_name(), self.model)
    }

    async fn synthesize(&self, question: &str, context: &str) -> AppResult<String> {
        let prompt = render_prompt(question, context)?;
        let request = LlmRequest::new(prompt, self.model.clone());

        let response = self
            .client
            .complete(&request)
            .await
            .map_err(|e| AppError::Synthesis(format!("LLM request failed: {}", e)))?;

        let answer = response.content.trim();
        if answer.is_empty() {
            return Err(AppError::Synthesis("LLM returned an empty answer".to_string()));
        }

        Ok(answer.to_string())
    }
}
