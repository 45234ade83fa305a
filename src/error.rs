//! Error types for the sustainable planner.

use std::path::PathBuf;

use crate::pipeline::Step;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Errors reading the knowledge document directory.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read knowledge document {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while running the prompt chain.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Step {} ({}) failed: {source}", .step.number(), .step.agent().role)]
    Generation {
        step: Step,
        #[source]
        source: LlmError,
    },

    #[error("Step {} ({}) returned an empty response", .step.number(), .step.agent().role)]
    EmptyOutput { step: Step },
}

/// Errors surfaced to the user when a plan is requested.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Pre-flight failure: no credential for the generation service.
    #[error("Please set {env_var} in .env file")]
    MissingCredential { env_var: String },

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl PlanError {
    /// Message shown in the UI for this failure.
    ///
    /// The credential check gets its own wording; everything else collapses
    /// into a single generic error line.
    pub fn user_message(&self) -> String {
        match self {
            PlanError::MissingCredential { .. } => format!("⚠️ {self}"),
            other => format!("❌ Error: {other}"),
        }
    }

    /// Follow-up hint displayed under a generic failure.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            PlanError::MissingCredential { .. } => None,
            _ => Some("Make sure your API key is set correctly in .env file"),
        }
    }
}
