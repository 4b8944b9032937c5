//! Question answering over the retrieval engine.

use crate::engine::RetrievalEngine;
use crate::rag::synthesis::AnswerSynthesizer;
use crate::rag::types::{Answer, AnswerMode};
use crate::types::SearchHit;
use knowqa_core::{AppError, AppResult};

/// Number of hits passed to the synthesizer as context.
pub const CONTEXT_CHUNKS: usize = 3;

/// Answer `question` from the indexed documents.
///
/// With a synthesizer the answer is generated from the top hits; without
/// one, or when it fails, the best chunk is returned verbatim.
pub async fn ask(
    engine: &RetrievalEngine,
    synthesizer: Option<&dyn AnswerSynthesizer>,
    question: &str,
    top_k: usize,
) -> AppResult<Answer> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::Input("Question cannot be empty".to_string()));
    }

    if engine.stats().await.total_documents == 0 {
        return Err(AppError::Input(
            "No documents uploaded yet. Please upload documents first.".to_string(),
        ));
    }

    let hits = engine.search(question, top_k).await?;
    let Some(top) = hits.first() else {
        tracing::info!("No chunks retrieved for question");
        return Ok(Answer::no_information());
    };

    let used = &hits[..hits.len().min(CONTEXT_CHUNKS)];
    let context = build_context(used);

    let (answer, mode) = match synthesizer {
        Some(synthesizer) => match synthesizer.synthesize(question, &context).await {
            Ok(answer) => (answer, AnswerMode::Synthesized),
            Err(e) => {
                tracing::error!("Answer synthesis failed, using top chunk: {}", e);
                (top.content.clone(), AnswerMode::RetrievalFallback)
            }
        },
        None => (top.content.clone(), AnswerMode::RetrievalOnly),
    };

    tracing::info!(
        "Answered from {} chunks (top: {}, similarity: {:.4}, mode: {})",
        used.len(),
        top.filename,
        top.similarity,
        mode
    );

    Ok(Answer {
        answer,
        source: Some(top.filename.clone()),
        similarity: round4(top.similarity),
        mode,
        sources_used: used.iter().map(|hit| hit.filename.clone()).collect(),
    })
}

/// Context block for the synthesis prompt.
pub fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("From {}:\n{}", hit.filename, hit.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}
