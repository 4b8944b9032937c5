//! Ask command handler.
//!
//! Answers a question from the indexed documents, synthesizing with the
//! configured language model when one is available.

use clap::Args;
use knowqa_core::config::AppConfig;
use knowqa_knowledge::{rag, AnswerSynthesizer, LlmSynthesizer, OpenMode};

/// Ask a question about the uploaded documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of chunks to retrieve (default: retrieval.topK)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Answer from retrieval only, without the language model
    #[arg(long)]
    pub no_synthesis: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing ask command");

        let engine = super::open_engine(config, OpenMode::LoadOrCreate)?;
        let synthesizer = if self.no_synthesis {
            None
        } else {
            LlmSynthesizer::from_config(config)?
        };
        if synthesizer.is_none() {
            tracing::info!("No answer synthesizer available, answering from retrieval only");
        }

        let top_k = self.top_k.unwrap_or(config.retrieval.top_k);
        let answer = rag::ask(
            &engine,
            synthesizer.as_ref().map(|s| s as &dyn AnswerSynthesizer),
            &self.question,
            top_k,
        )
        .await?;

        if self.json {
            super::print_json(&answer)?;
        } else {
            println!("{}", answer.answer);
            println!();
            match &answer.source {
                Some(source) => println!(
                    "Source: {} (similarity {:.4}, mode: {})",
                    source, answer.similarity, answer.mode
                ),
                None => println!("Source: none (mode: {})", answer.mode),
            }
            if answer.sources_used.len() > 1 {
                println!("Context from: {}", answer.sources_used.join(", "));
            }
        }

        Ok(())
    }
}
