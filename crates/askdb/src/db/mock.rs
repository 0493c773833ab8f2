//! Mock database for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{AskDbError, Result};
use crate::schema::SchemaSnapshot;

use super::{DbError, Execution, Row, SchemaIntrospector, SqlExecutor};

/// In-memory database that answers from a fixed snapshot and a script of
/// per-statement results.
///
/// Statements are matched on their trimmed text. Unscripted statements get
/// the fallback result (a completed statement with no rows by default).
/// Every executed statement is recorded for later assertions.
pub struct MockDatabase {
    snapshot: SchemaSnapshot,
    introspection_error: Option<String>,
    connection_error: Option<String>,
    results: HashMap<String, Execution>,
    fallback: Execution,
    executed: Mutex<Vec<String>>,
    snapshot_calls: AtomicUsize,
}

impl MockDatabase {
    /// Create a mock database exposing the given schema.
    pub fn new(snapshot: SchemaSnapshot) -> Self {
        Self {
            snapshot,
            introspection_error: None,
            connection_error: None,
            results: HashMap::new(),
            fallback: Execution::Completed { rows_affected: 0 },
            executed: Mutex::new(Vec::new()),
            snapshot_calls: AtomicUsize::new(0),
        }
    }

    /// Answer `sql` with the given rows.
    pub fn with_rows(mut self, sql: &str, rows: Vec<Row>) -> Self {
        self.results
            .insert(sql.trim().to_string(), Execution::Rows { rows });
        self
    }

    /// Reject `sql` with the given database error.
    pub fn with_failure(mut self, sql: &str, error: DbError) -> Self {
        self.results
            .insert(sql.trim().to_string(), Execution::Failed { error });
        self
    }

    /// Result for statements that were not scripted.
    pub fn with_fallback(mut self, execution: Execution) -> Self {
        self.fallback = execution;
        self
    }

    /// Make every introspection call fail.
    pub fn with_introspection_error(mut self, message: impl Into<String>) -> Self {
        self.introspection_error = Some(message.into());
        self
    }

    /// Make every execution fail as if the server were unreachable.
    pub fn with_connection_error(mut self, message: impl Into<String>) -> Self {
        self.connection_error = Some(message.into());
        self
    }

    /// Statements executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of times the schema was introspected.
    pub fn snapshot_calls(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }
}

impl SchemaIntrospector for MockDatabase {
    fn snapshot(&self) -> Result<SchemaSnapshot> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        match self.introspection_error {
            Some(ref message) => Err(AskDbError::Introspection(message.clone())),
            None => Ok(self.snapshot.clone()),
        }
    }
}

impl SqlExecutor for MockDatabase {
    fn execute(&self, sql: &str) -> Result<Execution> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.to_string());
        }
        if let Some(ref message) = self.connection_error {
            return Err(AskDbError::Connection(message.clone()));
        }

        Ok(self
            .results
            .get(sql.trim())
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}
