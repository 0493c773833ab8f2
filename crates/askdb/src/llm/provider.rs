//! SQL generator trait and types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default Ollama generate endpoint.
pub const DEFAULT_API_URL: &str = "http://localhost:11434/api/generate";

/// Default model: a small coder model that runs comfortably on a laptop.
pub const DEFAULT_MODEL: &str = "qwen2.5-coder:3b";

/// The generation backend could not be reached or did not answer usefully.
///
/// This is never retried by the correction loop.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Error connecting to generation backend: {message}")]
pub struct ConnectivityError {
    pub message: String,
}

impl ConnectivityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Cleaned SQL text, or the reason the backend could not produce any.
pub type GenerationResult = std::result::Result<String, ConnectivityError>;

/// Configuration for generation backends.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Full URL of the generate endpoint.
    pub api_url: String,

    /// Model to use (e.g., "qwen2.5-coder:3b").
    pub model: String,

    /// Maximum tokens in response.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0). Kept low so the same prompt
    /// yields the same SQL.
    pub temperature: f64,

    /// Request timeout. Large schema contexts make local models slow.
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 250,
            temperature: 0.1,
            timeout: Duration::from_secs(90),
        }
    }
}

impl LlmConfig {
    /// Create a configuration from `OLLAMA_HOST` and `ASKDB_MODEL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: std::env::var("OLLAMA_HOST")
                .map(|host| format!("{}/api/generate", host.trim_end_matches('/')))
                .unwrap_or(defaults.api_url),
            model: std::env::var("ASKDB_MODEL").unwrap_or(defaults.model),
            ..defaults
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the endpoint URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Trait for SQL generation backends.
///
/// Implementations must be thread-safe (Send + Sync) so one generator can
/// serve concurrent questions.
pub trait SqlGenerator: Send + Sync {
    /// Generate a first SQL candidate for a question.
    ///
    /// # Arguments
    /// * `question` - The user's natural-language question
    /// * `schema_context` - Rendered `CREATE TABLE` statements
    fn generate_initial(&self, question: &str, schema_context: &str) -> GenerationResult;

    /// Generate a corrected SQL candidate after the database rejected one.
    ///
    /// # Arguments
    /// * `question` - The original question
    /// * `failed_sql` - The SQL the database rejected
    /// * `error_message` - The database's error text, verbatim
    /// * `schema_context` - Rendered `CREATE TABLE` statements
    fn generate_repair(
        &self,
        question: &str,
        failed_sql: &str,
        error_message: &str,
        schema_context: &str,
    ) -> GenerationResult;

    /// Get the configuration for this generator.
    fn config(&self) -> &LlmConfig;

    /// Get the name of this generator (for logging/debugging).
    fn name(&self) -> &str;
}
