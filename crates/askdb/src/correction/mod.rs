//! The self-correcting generate/execute/repair loop.
//!
//! One run reads the schema, asks the generator for SQL and executes it.
//! When the database rejects a candidate, the exact SQL and error text go
//! back to the generator for a repaired candidate, until a candidate
//! succeeds or `max_attempts` executions have been rejected.
//!
//! A generator connectivity failure ends the run at once, whether it happens
//! on the first call or on a repair. So does losing the database connection.

mod attempt;
mod outcome;

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::db::{Execution, SchemaIntrospector, SqlExecutor};
use crate::error::{AskDbError, Result};
use crate::llm::SqlGenerator;
use crate::schema::render_context;

pub use attempt::{Attempt, AttemptOutcome};
pub use outcome::{ChatResponse, ChatStatus, LoopResult, Outcome};

/// Default bound on executions per question.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// The generate/execute/repair state machine over borrowed components.
pub struct CorrectionLoop<'a> {
    introspector: &'a dyn SchemaIntrospector,
    executor: &'a dyn SqlExecutor,
    generator: &'a dyn SqlGenerator,
    max_attempts: usize,
}

impl<'a> CorrectionLoop<'a> {
    pub fn new(
        introspector: &'a dyn SchemaIntrospector,
        executor: &'a dyn SqlExecutor,
        generator: &'a dyn SqlGenerator,
    ) -> Self {
        Self {
            introspector,
            executor,
            generator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Bound the number of executions. Values below 1 are treated as 1.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Answer one question.
    ///
    /// Only introspection failures are returned as `Err`. Rejected SQL, an
    /// unreachable generator and an unreachable database are reported through
    /// the [`Outcome`] together with the attempts made so far.
    pub fn run(&self, question: &str) -> Result<LoopResult> {
        self.run_inner(question, None)
    }

    /// Like [`run`](Self::run), but gives up with [`AskDbError::Cancelled`]
    /// at the next step once `cancel` is set.
    pub fn run_with_cancel(&self, question: &str, cancel: &AtomicBool) -> Result<LoopResult> {
        self.run_inner(question, Some(cancel))
    }

    fn run_inner(&self, question: &str, cancel: Option<&AtomicBool>) -> Result<LoopResult> {
        check_cancelled(cancel)?;
        let snapshot = self.introspector.snapshot()?;
        let context = render_context(&snapshot);
        debug!(tables = snapshot.table_count(), "schema context rendered");

        let mut attempts: Vec<Attempt> = Vec::with_capacity(self.max_attempts);

        check_cancelled(cancel)?;
        let mut sql = match self.generator.generate_initial(question, &context) {
            Ok(sql) => sql,
            Err(err) => {
                warn!(generator = self.generator.name(), error = %err.message, "initial generation failed");
                attempts.push(Attempt::generation_failed(0, err.message.clone()));
                return Ok(LoopResult::new(
                    Outcome::ConnectivityFailure {
                        sql: None,
                        message: err.message,
                    },
                    attempts,
                ));
            }
        };

        loop {
            check_cancelled(cancel)?;
            let index = attempts.len();
            info!(attempt = index, %sql, "executing candidate");
            attempts.push(Attempt::pending(index, sql.clone()));

            let execution = match self.executor.execute(&sql) {
                Ok(execution) => execution,
                Err(err) => {
                    let message = err.to_string();
                    warn!(attempt = index, error = %message, "database unreachable");
                    attempts[index].resolve(AttemptOutcome::ConnectionError {
                        message: message.clone(),
                    });
                    return Ok(LoopResult::new(
                        Outcome::DatabaseUnavailable { sql, message },
                        attempts,
                    ));
                }
            };
            let error = match execution {
                Execution::Failed { error } => error,
                execution => {
                    attempts[index].resolve(AttemptOutcome::Succeeded);
                    info!(attempt = index, "candidate succeeded");
                    return Ok(LoopResult::new(
                        Outcome::Success {
                            sql,
                            rows: execution.into_rows(),
                        },
                        attempts,
                    ));
                }
            };

            warn!(attempt = index, error = %error.message, "candidate rejected");
            attempts[index].resolve(AttemptOutcome::DbError {
                message: error.message.clone(),
            });

            if attempts.len() >= self.max_attempts {
                info!(attempts = attempts.len(), "attempt budget exhausted");
                return Ok(LoopResult::new(
                    Outcome::ExhaustedRetries {
                        last_sql: sql,
                        last_error: error.message,
                    },
                    attempts,
                ));
            }

            check_cancelled(cancel)?;
            match self
                .generator
                .generate_repair(question, &sql, &error.message, &context)
            {
                Ok(repaired) => sql = repaired,
                Err(err) => {
                    warn!(generator = self.generator.name(), error = %err.message, "repair generation failed");
                    attempts.push(Attempt::generation_failed(attempts.len(), err.message.clone()));
                    return Ok(LoopResult::new(
                        Outcome::ConnectivityFailure {
                            sql: Some(sql),
                            message: err.message,
                        },
                        attempts,
                    ));
                }
            }
        }
    }
}

fn check_cancelled(cancel: Option<&AtomicBool>) -> Result<()> {
    match cancel {
        Some(flag) if flag.load(Ordering::SeqCst) => Err(AskDbError::Cancelled),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DbError, MockDatabase};
    use crate::llm::MockProvider;
    use crate::schema::{Column, SchemaSnapshot, Table};

    fn users_db() -> MockDatabase {
        MockDatabase::new(
            SchemaSnapshot::new(vec![Table::new(
                "users",
                vec![
                    Column::new("id", "integer").primary_key(),
                    Column::new("username", "character varying"),
                ],
            )])
            .unwrap(),
        )
    }

    #[test]
    fn test_max_attempts_is_at_least_one() {
        let db = users_db();
        let generator = MockProvider::new();
        let correction = CorrectionLoop::new(&db, &db, &generator).with_max_attempts(0);
        assert_eq!(correction.max_attempts(), 1);
    }

    #[test]
    fn test_single_attempt_budget_never_repairs() {
        let db = users_db().with_failure("SELECT * FROM usrs;", DbError::new("no such table"));
        let generator = MockProvider::with_responses(["SELECT * FROM usrs;", "SELECT * FROM users;"]);

        let result = CorrectionLoop::new(&db, &db, &generator)
            .with_max_attempts(1)
            .run("show all users")
            .unwrap();

        assert!(matches!(result.outcome, Outcome::ExhaustedRetries { .. }));
        assert_eq!(result.attempts.len(), 1);
        assert_eq!(generator.requests().len(), 1);
    }

    #[test]
    fn test_completed_statement_is_success_without_rows() {
        let db = users_db();
        let generator = MockProvider::with_responses(["CREATE TABLE IF NOT EXISTS t (id INT);"]);

        let result = CorrectionLoop::new(&db, &db, &generator).run("make a table t").unwrap();

        assert_eq!(
            result.outcome,
            Outcome::Success {
                sql: "CREATE TABLE IF NOT EXISTS t (id INT);".to_string(),
                rows: vec![],
            }
        );
        assert_eq!(result.attempts[0].outcome, AttemptOutcome::Succeeded);
    }

    #[test]
    fn test_lost_connection_keeps_attempt_log() {
        let db = users_db().with_connection_error("Failed to connect to localhost:5432/agentic_db");
        let generator = MockProvider::with_responses(["SELECT * FROM users;"]);

        let result = CorrectionLoop::new(&db, &db, &generator).run("show all users").unwrap();

        assert_eq!(
            result.outcome,
            Outcome::DatabaseUnavailable {
                sql: "SELECT * FROM users;".to_string(),
                message: "Connection error: Failed to connect to localhost:5432/agentic_db"
                    .to_string(),
            }
        );
        assert_eq!(result.attempts.len(), 1);
        assert!(matches!(
            result.attempts[0].outcome,
            AttemptOutcome::ConnectionError { .. }
        ));
        assert_eq!(result.attempts_used(), 0);
    }

    #[test]
    fn test_cancelled_before_start() {
        let db = users_db();
        let generator = MockProvider::with_responses(["SELECT 1;"]);
        let cancel = AtomicBool::new(true);

        let err = CorrectionLoop::new(&db, &db, &generator)
            .run_with_cancel("q", &cancel)
            .unwrap_err();

        assert!(matches!(err, AskDbError::Cancelled));
        assert_eq!(db.snapshot_calls(), 0);
        assert!(generator.requests().is_empty());
    }
}
