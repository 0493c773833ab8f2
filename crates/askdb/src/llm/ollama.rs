//! Ollama local LLM provider implementation.
//!
//! Ollama allows running LLMs locally without API keys.
//! Install from: https://ollama.ai

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{AskDbError, Result};

use super::prompts;
use super::provider::{ConnectivityError, GenerationResult, LlmConfig, SqlGenerator};

/// Ollama local LLM provider using the `/api/generate` completion endpoint.
pub struct OllamaProvider {
    client: Client,
    config: LlmConfig,
}

impl OllamaProvider {
    /// Create a new Ollama provider from the environment (`OLLAMA_HOST`,
    /// `ASKDB_MODEL`).
    ///
    /// Uses qwen2.5-coder:3b by default. Make sure you've pulled it:
    /// `ollama pull qwen2.5-coder:3b`
    pub fn new() -> Result<Self> {
        Self::with_config(LlmConfig::from_env())
    }

    /// Create with a specific model.
    ///
    /// Models that work well for SQL:
    /// - `qwen2.5-coder:3b` - Fast, good enough for simple schemas
    /// - `qwen2.5-coder:7b` - Better joins and aggregations, slower
    /// - `sqlcoder` - Tuned for text-to-SQL
    pub fn with_model(model: impl Into<String>) -> Result<Self> {
        Self::with_config(LlmConfig::from_env().with_model(model))
    }

    /// Create with custom configuration.
    pub fn with_config(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AskDbError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build headers for API requests.
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Send a prompt to Ollama and return the cleaned response text.
    fn send_prompt(&self, prompt: &str) -> GenerationResult {
        let body = json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens
            }
        });

        debug!(model = %self.config.model, prompt_len = prompt.len(), "sending prompt");

        let response = self
            .client
            .post(&self.config.api_url)
            .headers(self.build_headers())
            .json(&body)
            .send()
            .map_err(|e| {
                let message = if e.is_connect() {
                    format!(
                        "Failed to connect to Ollama at {}. Is it running? Start with: ollama serve",
                        self.config.api_url
                    )
                } else if e.is_timeout() {
                    format!(
                        "Ollama did not answer within {}s",
                        self.config.timeout.as_secs()
                    )
                } else {
                    format!("Ollama request failed: {}", e)
                };
                warn!(%message, "generation backend unreachable");
                ConnectivityError::new(message)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();

            let message = if error_text.contains("not found") {
                format!(
                    "Model '{}' not found. Pull it with: ollama pull {}",
                    self.config.model, self.config.model
                )
            } else {
                format!("Ollama error ({}): {}", status, error_text)
            };
            warn!(%message, "generation backend returned an error");
            return Err(ConnectivityError::new(message));
        }

        let api_response: OllamaResponse = response
            .json()
            .map_err(|e| ConnectivityError::new(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(prompts::clean_response(&api_response.response))
    }
}

impl SqlGenerator for OllamaProvider {
    fn generate_initial(&self, question: &str, schema_context: &str) -> GenerationResult {
        let prompt = prompts::initial_prompt(question, schema_context);
        self.send_prompt(&prompt)
    }

    fn generate_repair(
        &self,
        question: &str,
        failed_sql: &str,
        error_message: &str,
        schema_context: &str,
    ) -> GenerationResult {
        let prompt = prompts::repair_prompt(question, failed_sql, error_message, schema_context);
        self.send_prompt(&prompt)
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama generate API response structure.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}
