//! Retrieval-augmented answering.

pub mod ask;
pub mod synthesis;
pub mod types;

pub use ask::{ask, build_context};
pub use synthesis::{AnswerSynthesizer, LlmSynthesizer, SynthesisStatus};
pub use types::{Answer, AnswerMode};
