//! Database access: schema introspection and SQL execution.
//!
//! The correction loop only talks to the database through two narrow
//! capabilities:
//!
//! - [`SchemaIntrospector`] reads the live catalog into a [`SchemaSnapshot`]
//! - [`SqlExecutor`] runs one SQL string and reports rows or a database error
//!
//! [`PostgresDatabase`] implements both against a live server, opening a
//! fresh connection per call. [`MockDatabase`] is a scripted stand-in for
//! tests.

mod config;
mod ddl;
mod mock;
mod pg;
mod split;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::SchemaSnapshot;

pub use config::DatabaseConfig;
pub use ddl::{DdlAction, DdlRequest};
pub use mock::MockDatabase;
pub use pg::PostgresDatabase;

/// One result row, keyed by column name in result-set order.
///
/// Values use PostgreSQL's text representation; SQL NULL is `None`.
pub type Row = IndexMap<String, Option<String>>;

/// A statement rejected by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbError {
    /// Raw database error text, including detail and hint lines when present.
    pub message: String,
    /// SQLSTATE code, when the server reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl DbError {
    /// Create a database error without an SQLSTATE code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Attach an SQLSTATE code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of executing one SQL string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Execution {
    /// The statement produced a result set (possibly empty).
    Rows { rows: Vec<Row> },
    /// The statement completed without producing a result set.
    Completed { rows_affected: u64 },
    /// The database rejected the statement.
    Failed { error: DbError },
}

impl Execution {
    /// Returns true unless the database rejected the statement.
    pub fn is_success(&self) -> bool {
        !matches!(self, Execution::Failed { .. })
    }

    /// Rows returned by the statement; empty when there was no result set.
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Execution::Rows { rows } => rows,
            _ => Vec::new(),
        }
    }
}

/// Reads the live database structure.
pub trait SchemaIntrospector: Send + Sync {
    /// Read the user-visible tables and their columns.
    ///
    /// Fails with [`AskDbError::Introspection`](crate::AskDbError::Introspection)
    /// when the metadata queries cannot be run.
    fn snapshot(&self) -> Result<SchemaSnapshot>;
}

/// Executes arbitrary SQL.
///
/// Statements the database rejects come back as [`Execution::Failed`], never
/// as `Err`. `Err` is reserved for failures to reach the database at all.
pub trait SqlExecutor: Send + Sync {
    fn execute(&self, sql: &str) -> Result<Execution>;
}

/// Statement that creates the sample `users` table.
pub const SAMPLE_SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    username VARCHAR(50) NOT NULL,
    email VARCHAR(100),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);";

/// Create the sample `users` table if it does not exist yet.
pub fn seed_sample_schema(executor: &dyn SqlExecutor) -> Result<Execution> {
    executor.execute(SAMPLE_SCHEMA_SQL)
}
