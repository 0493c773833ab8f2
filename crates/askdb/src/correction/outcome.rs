//! Terminal outcomes and the caller-facing response.

use serde::{Deserialize, Serialize};

use crate::db::Row;

use super::attempt::Attempt;

/// How a question ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The database accepted a candidate.
    Success { sql: String, rows: Vec<Row> },
    /// The generation backend was unreachable. `sql` is the last candidate
    /// generated before the failure, if any.
    ConnectivityFailure { sql: Option<String>, message: String },
    /// Every attempt was rejected by the database.
    ExhaustedRetries { last_sql: String, last_error: String },
    /// The database could not be reached to run `sql`.
    DatabaseUnavailable { sql: String, message: String },
}

/// Outcome of one loop run plus the attempts that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopResult {
    pub outcome: Outcome,
    pub attempts: Vec<Attempt>,
}

impl LoopResult {
    pub fn new(outcome: Outcome, attempts: Vec<Attempt>) -> Self {
        Self { outcome, attempts }
    }

    /// Number of executions the database rejected.
    pub fn attempts_used(&self) -> usize {
        self.attempts.iter().filter(|a| a.is_db_error()).count()
    }
}

/// Status reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    Success,
    ConnectivityFailure,
    Exhausted,
    DatabaseUnavailable,
}

impl std::fmt::Display for ChatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatStatus::Success => write!(f, "success"),
            ChatStatus::ConnectivityFailure => write!(f, "connectivity_failure"),
            ChatStatus::Exhausted => write!(f, "exhausted"),
            ChatStatus::DatabaseUnavailable => write!(f, "database_unavailable"),
        }
    }
}

/// What a caller gets back for one question.
///
/// `sql` is always the statement that answered the question or the last one
/// tried, so the user can see what was run either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub status: ChatStatus,
    pub sql: String,
    pub rows: Vec<Row>,
    /// Number of executions the database rejected.
    pub attempts_used: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub attempts: Vec<Attempt>,
}

impl ChatResponse {
    pub fn is_success(&self) -> bool {
        self.status == ChatStatus::Success
    }
}

impl From<LoopResult> for ChatResponse {
    fn from(result: LoopResult) -> Self {
        let attempts_used = result.attempts_used();
        let (status, sql, rows, error_message) = match result.outcome {
            Outcome::Success { sql, rows } => (ChatStatus::Success, sql, rows, None),
            Outcome::ConnectivityFailure { sql, message } => (
                ChatStatus::ConnectivityFailure,
                sql.unwrap_or_default(),
                Vec::new(),
                Some(message),
            ),
            Outcome::ExhaustedRetries {
                last_sql,
                last_error,
            } => (ChatStatus::Exhausted, last_sql, Vec::new(), Some(last_error)),
            Outcome::DatabaseUnavailable { sql, message } => (
                ChatStatus::DatabaseUnavailable,
                sql,
                Vec::new(),
                Some(message),
            ),
        };

        Self {
            status,
            sql,
            rows,
            attempts_used,
            error_message,
            attempts: result.attempts,
        }
    }
}
