//! askdb: ask a PostgreSQL database questions in plain language.
//!
//! askdb turns a natural-language question into SQL with a text-generation
//! backend, runs it against the live database, and when the database rejects
//! the query it feeds the error back to the backend for a corrected attempt.
//!
//! # Core Principles
//!
//! - **Live schema**: Every question re-reads the database structure
//! - **Bounded repair**: Rejected queries are regenerated up to a fixed budget
//! - **Full transparency**: Every attempted SQL statement is reported back
//!
//! # Example
//!
//! ```no_run
//! use askdb::{AskDb, AskDbConfig};
//!
//! let askdb = AskDb::from_config(&AskDbConfig::from_env()).unwrap();
//! let response = askdb.ask("show all users").unwrap();
//!
//! println!("SQL: {}", response.sql);
//! println!("Rows: {}", response.rows.len());
//! ```

pub mod correction;
pub mod db;
pub mod error;
pub mod llm;
pub mod schema;

mod askdb;

pub use crate::askdb::{AskDb, AskDbConfig};
pub use correction::{
    Attempt, AttemptOutcome, ChatResponse, ChatStatus, CorrectionLoop, LoopResult, Outcome,
};
pub use db::{
    DatabaseConfig, DbError, DdlAction, DdlRequest, Execution, MockDatabase, PostgresDatabase,
    Row, SAMPLE_SCHEMA_SQL, SchemaIntrospector, SqlExecutor, seed_sample_schema,
};
pub use error::{AskDbError, Result};
pub use llm::{
    ConnectivityError, GenerationRequest, GenerationResult, LlmConfig, MockProvider,
    OllamaProvider, SqlGenerator,
};
pub use schema::{Column, ForeignKey, SchemaSnapshot, Table, render_context};
