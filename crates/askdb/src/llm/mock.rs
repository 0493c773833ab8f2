//! Mock SQL generator for testing.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::prompts;
use super::provider::{ConnectivityError, GenerationResult, LlmConfig, SqlGenerator};

/// A generation call received by [`MockProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Initial {
        question: String,
        prompt: String,
    },
    Repair {
        question: String,
        failed_sql: String,
        error_message: String,
        prompt: String,
    },
}

impl GenerationRequest {
    /// The full prompt a real backend would have received.
    pub fn prompt(&self) -> &str {
        match self {
            GenerationRequest::Initial { prompt, .. } | GenerationRequest::Repair { prompt, .. } => {
                prompt
            }
        }
    }
}

/// Mock generator that replays a fixed script of responses.
///
/// Each call pops the next scripted result; SQL responses go through the
/// same cleaning as real backend output. Once the script runs out every call
/// fails with a [`ConnectivityError`].
pub struct MockProvider {
    config: LlmConfig,
    script: Mutex<VecDeque<GenerationResult>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty script.
    pub fn new() -> Self {
        Self::with_config(LlmConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: LlmConfig) -> Self {
        Self {
            config,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that answers with each SQL string in turn.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for sql in responses {
            provider.push_response(sql);
        }
        provider
    }

    /// Append an SQL response to the script.
    pub fn push_response(&self, sql: impl Into<String>) -> &Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Ok(sql.into()));
        }
        self
    }

    /// Append a connectivity failure to the script.
    pub fn push_unreachable(&self, message: impl Into<String>) -> &Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Err(ConnectivityError::new(message)));
        }
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn next(&self, request: GenerationRequest) -> GenerationResult {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| Err(ConnectivityError::new("mock script exhausted")))
            .map(|sql| prompts::clean_response(&sql))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlGenerator for MockProvider {
    fn generate_initial(&self, question: &str, schema_context: &str) -> GenerationResult {
        self.next(GenerationRequest::Initial {
            question: question.to_string(),
            prompt: prompts::initial_prompt(question, schema_context),
        })
    }

    fn generate_repair(
        &self,
        question: &str,
        failed_sql: &str,
        error_message: &str,
        schema_context: &str,
    ) -> GenerationResult {
        self.next(GenerationRequest::Repair {
            question: question.to_string(),
            failed_sql: failed_sql.to_string(),
            error_message: error_message.to_string(),
            prompt: prompts::repair_prompt(question, failed_sql, error_message, schema_context),
        })
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}
