//! askdb CLI - ask a PostgreSQL database questions in plain language.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Exit code when a question was handled but not answered.
const EXIT_UNANSWERED: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Ask {
            question,
            max_attempts,
            model,
            mock_llm,
            json,
        } => commands::ask::run(question, max_attempts, model, mock_llm, json, cli.verbose),

        Commands::Schema { json, context } => commands::schema::run(json, context, cli.verbose),

        Commands::Exec { sql, json } => commands::exec::run(sql, json, cli.verbose),

        Commands::Ddl {
            action,
            table,
            column,
            column_type,
            new_name,
            references_table,
            references_column,
            constraint,
        } => commands::ddl::run(
            commands::ddl::DdlArgs {
                action,
                table,
                column,
                column_type,
                new_name,
                references_table,
                references_column,
                constraint,
            },
            cli.verbose,
        ),

        Commands::Init => commands::init::run(cli.verbose),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_UNANSWERED),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Log to stderr so JSON output on stdout stays parseable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "askdb=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
