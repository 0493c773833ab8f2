//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};

/// askdb: ask a PostgreSQL database questions in plain language
#[derive(Parser)]
#[command(name = "askdb")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer a question by generating and running SQL
    Ask {
        /// The question, in plain language
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Maximum SQL executions before giving up
        #[arg(long)]
        max_attempts: Option<usize>,

        /// Model to use (e.g., "qwen2.5-coder:3b", "llama3.2")
        #[arg(long)]
        model: Option<String>,

        /// Use a scripted generator that answers with these SQL strings in turn
        #[arg(long = "mock-llm", value_name = "SQL")]
        mock_llm: Vec<String>,

        /// Output the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the live database schema
    Schema {
        /// Output as JSON
        #[arg(long, conflicts_with = "context")]
        json: bool,

        /// Output the CREATE TABLE context sent to the model
        #[arg(long)]
        context: bool,
    },

    /// Execute SQL directly
    Exec {
        /// SQL to execute
        #[arg(value_name = "SQL")]
        sql: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit the schema without writing SQL
    Ddl {
        /// Action (create_table, add_column, drop_column, drop_table, rename_table,
        /// rename_column, alter_column_type, add_foreign_key, drop_foreign_key)
        #[arg(value_name = "ACTION")]
        action: String,

        /// Table to edit
        #[arg(short, long)]
        table: String,

        /// Column to add, drop, rename, or retype
        #[arg(short, long)]
        column: Option<String>,

        /// Column type (e.g., "VARCHAR(100)")
        #[arg(long = "type")]
        column_type: Option<String>,

        /// New table or column name
        #[arg(long)]
        new_name: Option<String>,

        /// Referenced table for a foreign key
        #[arg(long)]
        references_table: Option<String>,

        /// Referenced column for a foreign key
        #[arg(long)]
        references_column: Option<String>,

        /// Foreign key constraint name
        #[arg(long)]
        constraint: Option<String>,
    },

    /// Create the sample users table
    Init,
}
