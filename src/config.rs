//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Default knowledge document directory, relative to the working directory.
pub const DEFAULT_KNOWLEDGE_DIR: &str = "./knowledge_base";

/// Default port for the web UI.
pub const DEFAULT_PORT: u16 = 8501;

/// Default sampling temperature for every step.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default completion budget per step.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Settings for the text-generation service.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub backend: LlmBackend,
    /// `None` when the credential variable is unset or blank.
    pub api_key: Option<SecretString>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmSettings {
    /// Settings for a backend with its default model and no credential.
    pub fn new(backend: LlmBackend) -> Self {
        Self {
            backend,
            api_key: None,
            model: backend.default_model().to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Name of the environment variable holding the credential.
    pub fn credential_env_var(&self) -> &'static str {
        self.backend.api_key_env_var()
    }

    /// Provider configuration, or `None` when no credential is present.
    pub fn provider_config(&self) -> Option<LlmConfig> {
        self.api_key.as_ref().map(|key| LlmConfig {
            backend: self.backend,
            api_key: key.clone(),
            model: self.model.clone(),
        })
    }
}

/// Planner configuration, resolved from the environment.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub llm: LlmSettings,
    /// Directory of documents read by the knowledge step.
    pub knowledge_dir: PathBuf,
    /// Port the web UI listens on.
    pub port: u16,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            llm: LlmSettings::new(LlmBackend::OpenAi),
            knowledge_dir: PathBuf::from(DEFAULT_KNOWLEDGE_DIR),
            port: DEFAULT_PORT,
        }
    }
}

impl PlannerConfig {
    /// Resolve configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    ///
    /// A missing credential is not an error here; it is reported when a plan
    /// is requested so the UI can still be served.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("PLANNER_LLM_BACKEND") {
            Some(raw) => raw.parse::<LlmBackend>()?,
            None => LlmBackend::OpenAi,
        };

        let mut llm = LlmSettings::new(backend);
        llm.api_key = lookup(backend.api_key_env_var())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(SecretString::from);

        if let Some(model) = lookup("PLANNER_MODEL").filter(|m| !m.trim().is_empty()) {
            llm.model = model.trim().to_string();
        }
        if let Some(raw) = lookup("PLANNER_TEMPERATURE") {
            llm.temperature = parse_value("PLANNER_TEMPERATURE", &raw)?;
        }
        if let Some(raw) = lookup("PLANNER_MAX_TOKENS") {
            llm.max_tokens = parse_value("PLANNER_MAX_TOKENS", &raw)?;
        }

        let knowledge_dir = lookup("PLANNER_KNOWLEDGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KNOWLEDGE_DIR));

        let port = match lookup("PLANNER_PORT") {
            Some(raw) => parse_value("PLANNER_PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            llm,
            knowledge_dir,
            port,
        })
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?}: {e}"),
        })
}
