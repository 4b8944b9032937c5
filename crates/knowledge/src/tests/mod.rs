//! Cross-component tests for the retrieval engine.

mod ask_modes;
mod engine_failures;
mod support;
