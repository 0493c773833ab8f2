//! Individual generate-and-execute attempts.

use serde::{Deserialize, Serialize};

/// What happened to one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Recorded but not yet executed.
    Pending,
    /// The database accepted the statement.
    Succeeded,
    /// The database rejected the statement.
    DbError { message: String },
    /// The database could not be reached to run the statement.
    ConnectionError { message: String },
    /// The generation backend could not produce SQL for this attempt.
    GenerationError { message: String },
}

/// One SQL candidate and its fate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// Zero-based position in the attempt sequence.
    pub index: usize,
    /// SQL that was (or would have been) executed. Empty for generation errors.
    pub sql: String,
    pub outcome: AttemptOutcome,
}

impl Attempt {
    /// A candidate about to be executed.
    pub fn pending(index: usize, sql: impl Into<String>) -> Self {
        Self {
            index,
            sql: sql.into(),
            outcome: AttemptOutcome::Pending,
        }
    }

    /// An attempt for which no SQL could be generated.
    pub fn generation_failed(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            sql: String::new(),
            outcome: AttemptOutcome::GenerationError {
                message: message.into(),
            },
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Pending)
    }

    /// Returns true if the database rejected this attempt.
    pub fn is_db_error(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::DbError { .. })
    }

    /// Set the outcome of a pending attempt. Resolved attempts are left as
    /// they are.
    pub(crate) fn resolve(&mut self, outcome: AttemptOutcome) {
        debug_assert!(self.is_pending(), "attempt {} resolved twice", self.index);
        if self.is_pending() {
            self.outcome = outcome;
        }
    }
}
