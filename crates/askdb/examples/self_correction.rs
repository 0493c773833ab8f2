//! Example: watch the correction loop repair a bad query.
//!
//! Runs entirely in memory with a scripted generator and database, so no
//! model or PostgreSQL server is needed.
//!
//! Usage:
//!   cargo run --example self_correction -- "show all users"

use std::env;

use askdb::{
    AskDb, AttemptOutcome, Column, DbError, MockDatabase, MockProvider, Row, SchemaSnapshot,
    Table, render_context,
};

fn main() -> askdb::Result<()> {
    let question = env::args()
        .nth(1)
        .unwrap_or_else(|| "show all users".to_string());

    let schema = SchemaSnapshot::new(vec![Table::new(
        "users",
        vec![
            Column::new("id", "integer").primary_key(),
            Column::new("username", "character varying").with_nullable(false),
            Column::new("email", "character varying"),
        ],
    )])?;

    let mut alice = Row::new();
    alice.insert("id".to_string(), Some("1".to_string()));
    alice.insert("username".to_string(), Some("alice".to_string()));
    alice.insert("email".to_string(), None);

    let database = MockDatabase::new(schema.clone())
        .with_failure(
            "SELECT * FROM usrs;",
            DbError::new("relation \"usrs\" does not exist").with_code("42P01"),
        )
        .with_rows("SELECT * FROM users;", vec![alice]);
    let generator =
        MockProvider::with_responses(["```sql\nSELECT * FROM usrs;\n```", "SELECT * FROM users;"]);

    let separator = "=".repeat(60);
    println!("{}", separator);
    println!("Question: {}", question);
    println!("{}", separator);
    println!();
    println!("Schema context:");
    println!("{}", render_context(&schema));
    println!();

    let askdb = AskDb::new(database, generator);
    let response = askdb.ask(&question)?;

    for attempt in &response.attempts {
        match &attempt.outcome {
            AttemptOutcome::DbError { message } => {
                println!("Attempt {}: {}  -> rejected: {}", attempt.index + 1, attempt.sql, message)
            }
            outcome => println!("Attempt {}: {}  -> {:?}", attempt.index + 1, attempt.sql, outcome),
        }
    }

    println!();
    println!("Status: {}", response.status);
    println!("Final SQL: {}", response.sql);
    println!("Rows: {}", response.rows.len());
    println!("Rejected attempts: {}", response.attempts_used);

    Ok(())
}
