//! AI review of pending changes.
//!
//! Provides the scan pipeline: prompt construction, the Gemini verdict
//! client, and the fail-closed verdict interpreter.

pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod verdict;
