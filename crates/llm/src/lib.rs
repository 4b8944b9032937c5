//! LLM integration crate for knowqa.
//!
//! A provider-agnostic abstraction for the answer-synthesis call: send a
//! prompt, receive generated text or a failure.
//!
//! # Providers
//! - **Gemini**: Google Generative Language API (default when a key is set)
//! - **Ollama**: Local LLM runtime
//!
//! # Example
//! ```no_run
//! use knowqa_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GeminiClient, OllamaClient};
pub use types::ProviderType;
