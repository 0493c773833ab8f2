//! Integration tests for the self-correcting loop.
//!
//! These run the full ask path against `MockDatabase` and `MockProvider`,
//! so no live model or database is needed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use askdb::{
    AskDb, AskDbError, AttemptOutcome, ChatStatus, Column, CorrectionLoop, DbError,
    GenerationRequest, MockDatabase, MockProvider, Outcome, Row, SchemaSnapshot, SqlExecutor,
    Table,
};

/// Schema with a single `users(id, username, email)` table.
fn users_schema() -> SchemaSnapshot {
    SchemaSnapshot::new(vec![Table::new(
        "users",
        vec![
            Column::new("id", "integer").primary_key(),
            Column::new("username", "character varying"),
            Column::new("email", "character varying"),
        ],
    )])
    .expect("valid schema")
}

fn user_row(id: &str, username: &str) -> Row {
    let mut row = Row::new();
    row.insert("id".to_string(), Some(id.to_string()));
    row.insert("username".to_string(), Some(username.to_string()));
    row.insert("email".to_string(), None);
    row
}

const UNDEFINED_USRS: &str = "relation \"usrs\" does not exist";

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_a_first_attempt_succeeds() {
    let db = MockDatabase::new(users_schema())
        .with_rows("SELECT * FROM users;", vec![user_row("1", "alice")]);
    let generator = MockProvider::with_responses(["SELECT * FROM users;"]);
    let askdb = AskDb::new(db, generator);

    let response = askdb.ask("show all users").expect("ask failed");

    assert_eq!(response.status, ChatStatus::Success);
    assert_eq!(response.sql, "SELECT * FROM users;");
    assert_eq!(response.attempts_used, 0);
    assert_eq!(response.rows, vec![user_row("1", "alice")]);
    assert!(response.error_message.is_none());
    assert_eq!(response.attempts.len(), 1);
}

#[test]
fn test_scenario_b_typo_is_repaired() {
    let db = MockDatabase::new(users_schema())
        .with_failure(
            "SELECT * FROM usrs;",
            DbError::new(UNDEFINED_USRS).with_code("42P01"),
        )
        .with_rows("SELECT * FROM users;", vec![]);
    let generator = MockProvider::with_responses(["SELECT * FROM usrs;", "SELECT * FROM users;"]);

    let result = CorrectionLoop::new(&db, &db, &generator)
        .run("show all users")
        .expect("run failed");

    assert_eq!(
        result.outcome,
        Outcome::Success {
            sql: "SELECT * FROM users;".to_string(),
            rows: vec![],
        }
    );
    assert_eq!(result.attempts_used(), 1);

    let requests = generator.requests();
    assert_eq!(requests.len(), 2);
    match &requests[1] {
        GenerationRequest::Repair {
            failed_sql,
            error_message,
            ..
        } => {
            assert_eq!(failed_sql, "SELECT * FROM usrs;");
            assert_eq!(error_message, UNDEFINED_USRS);
        }
        other => panic!("expected a repair request, got {:?}", other),
    }
}

#[test]
fn test_scenario_c_every_attempt_fails() {
    let mut db = MockDatabase::new(users_schema());
    let mut candidates = Vec::new();
    for i in 1..=5 {
        let sql = format!("SELECT * FROM missing_{};", i);
        db = db.with_failure(
            &sql,
            DbError::new(format!("relation \"missing_{}\" does not exist", i)),
        );
        candidates.push(sql);
    }
    let generator = MockProvider::with_responses(candidates.clone());
    let askdb = AskDb::new(db, generator);

    let response = askdb.ask("show all users").expect("ask failed");

    assert_eq!(response.status, ChatStatus::Exhausted);
    assert_eq!(response.attempts_used, 5);
    assert_eq!(response.sql, candidates[4]);
    assert_eq!(
        response.error_message.as_deref(),
        Some("relation \"missing_5\" does not exist")
    );
    assert!(response.attempts.iter().all(|a| a.is_db_error()));
}

#[test]
fn test_scenario_d_backend_unreachable() {
    let db = MockDatabase::new(users_schema());
    let generator = MockProvider::new();
    generator.push_unreachable("Failed to connect to Ollama at http://localhost:11434/api/generate");

    let result = CorrectionLoop::new(&db, &db, &generator)
        .run("show all users")
        .expect("run failed");

    assert!(matches!(
        result.outcome,
        Outcome::ConnectivityFailure { sql: None, .. }
    ));
    assert_eq!(result.attempts_used(), 0);
    assert!(db.executed().is_empty());
}

// =============================================================================
// Loop Behavior
// =============================================================================

#[test]
fn test_repair_prompt_contains_failure_verbatim() {
    let error_text = "syntax error at or near \"FORM\"\nHINT: check the keyword";
    let db = MockDatabase::new(users_schema())
        .with_failure("SELECT * FORM users;", DbError::new(error_text));
    let generator = MockProvider::with_responses(["SELECT * FORM users;", "SELECT * FROM users;"]);

    CorrectionLoop::new(&db, &db, &generator)
        .run("show all users")
        .expect("run failed");

    let requests = generator.requests();
    let prompt = requests[1].prompt();
    assert!(prompt.contains("SELECT * FORM users;"));
    assert!(prompt.contains(error_text));
    assert!(prompt.contains("CREATE TABLE users"));
}

#[test]
fn test_repair_connectivity_failure_is_not_exhausted() {
    let db = MockDatabase::new(users_schema())
        .with_failure("SELECT * FROM usrs;", DbError::new(UNDEFINED_USRS));
    let generator = MockProvider::with_responses(["SELECT * FROM usrs;"]);
    generator.push_unreachable("request timed out");

    let result = CorrectionLoop::new(&db, &db, &generator)
        .run("show all users")
        .expect("run failed");

    assert_eq!(
        result.outcome,
        Outcome::ConnectivityFailure {
            sql: Some("SELECT * FROM usrs;".to_string()),
            message: "request timed out".to_string(),
        }
    );
    assert_eq!(result.attempts_used(), 1);
    assert_eq!(db.executed().len(), 1);
    assert!(matches!(
        result.attempts.last().map(|a| &a.outcome),
        Some(AttemptOutcome::GenerationError { .. })
    ));
}

#[test]
fn test_attempts_never_exceed_budget() {
    for max in 1..=4 {
        let db = MockDatabase::new(users_schema()).with_fallback(askdb::Execution::Failed {
            error: DbError::new("permission denied for table users"),
        });
        let generator = MockProvider::with_responses(vec!["SELECT * FROM users;"; 10]);

        let result = CorrectionLoop::new(&db, &db, &generator)
            .with_max_attempts(max)
            .run("show all users")
            .expect("run failed");

        assert_eq!(result.attempts.len(), max);
        assert_eq!(db.executed().len(), max);
        assert!(matches!(result.outcome, Outcome::ExhaustedRetries { .. }));
    }
}

#[test]
fn test_schema_is_read_once_per_question() {
    let db = MockDatabase::new(users_schema())
        .with_failure("SELECT * FROM usrs;", DbError::new(UNDEFINED_USRS));
    let generator = MockProvider::with_responses(["SELECT * FROM usrs;", "SELECT * FROM users;"]);

    CorrectionLoop::new(&db, &db, &generator)
        .run("show all users")
        .expect("run failed");

    assert_eq!(db.snapshot_calls(), 1);
}

#[test]
fn test_introspection_error_propagates() {
    let db = MockDatabase::new(users_schema()).with_introspection_error("permission denied");
    let generator = MockProvider::with_responses(["SELECT 1;"]);

    let err = CorrectionLoop::new(&db, &db, &generator)
        .run("show all users")
        .unwrap_err();

    assert!(matches!(err, AskDbError::Introspection(_)));
    assert!(generator.requests().is_empty());
    assert!(db.executed().is_empty());
}

#[test]
fn test_lost_database_is_reported_with_pending_sql() {
    let db = MockDatabase::new(users_schema()).with_connection_error("connection refused");
    let generator = MockProvider::with_responses(["SELECT * FROM users;"]);
    let askdb = AskDb::new(db, generator);

    let response = askdb.ask("show all users").expect("ask failed");

    assert_eq!(response.status, ChatStatus::DatabaseUnavailable);
    assert_eq!(response.sql, "SELECT * FROM users;");
    assert_eq!(response.attempts_used, 0);
    assert_eq!(response.attempts.len(), 1);
    assert!(
        response
            .error_message
            .as_deref()
            .is_some_and(|m| m.contains("connection refused"))
    );
}

#[test]
fn test_cancellation_stops_before_repair() {
    struct CancellingDatabase<'a> {
        inner: MockDatabase,
        cancel: &'a AtomicBool,
    }

    impl SqlExecutor for CancellingDatabase<'_> {
        fn execute(&self, sql: &str) -> askdb::Result<askdb::Execution> {
            self.cancel.store(true, Ordering::SeqCst);
            self.inner.execute(sql)
        }
    }

    let cancel = AtomicBool::new(false);
    let introspector = MockDatabase::new(users_schema());
    let executor = CancellingDatabase {
        inner: MockDatabase::new(users_schema())
            .with_failure("SELECT * FROM usrs;", DbError::new(UNDEFINED_USRS)),
        cancel: &cancel,
    };
    let generator = MockProvider::with_responses(["SELECT * FROM usrs;", "SELECT * FROM users;"]);

    let err = CorrectionLoop::new(&introspector, &executor, &generator)
        .run_with_cancel("show all users", &cancel)
        .unwrap_err();

    assert!(matches!(err, AskDbError::Cancelled));
    assert_eq!(generator.requests().len(), 1);
}

#[test]
fn test_concurrent_questions_share_nothing() {
    let db = MockDatabase::new(users_schema()).with_rows("SELECT * FROM users;", vec![]);
    let generator = MockProvider::with_responses(vec!["SELECT * FROM users;"; 4]);
    let askdb = AskDb::new(db, generator);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| askdb.ask("show all users")))
            .collect();

        for handle in handles {
            let response = handle.join().expect("thread panicked").expect("ask failed");
            assert!(response.is_success());
            assert_eq!(response.attempts.len(), 1);
        }
    });
}
