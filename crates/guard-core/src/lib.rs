//! Core types, configuration, and error handling for ai-git-guard.
//!
//! This crate provides the shared foundation used by the other guard crates:
//! - [`GuardError`]: unified error type using `thiserror`
//! - [`GuardConfig`]: configuration loaded from `.ai-git-guard.toml`
//! - Shared types: [`Decision`], [`TemplateKind`], [`DiffMode`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{GuardConfig, LlmConfig, API_KEY_ENV, CONFIG_FILE};
pub use error::GuardError;
pub use types::{Decision, DiffMode, OutputFormat, TemplateKind};

/// A convenience `Result` type for guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;
