//! Ask command - answer a question with generated SQL.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use askdb::{AskDb, AskDbConfig, AttemptOutcome, ChatStatus, MockProvider, PostgresDatabase};
use colored::Colorize;

use super::{CommandResult, print_rows};

/// Exit code for a second Ctrl-C, matching a shell's SIGINT convention.
const EXIT_INTERRUPTED: i32 = 130;

pub fn run(
    question: String,
    max_attempts: Option<usize>,
    model: Option<String>,
    mock_llm: Vec<String>,
    json_output: bool,
    verbose: bool,
) -> CommandResult {
    let mut config = AskDbConfig::from_env();
    if let Some(n) = max_attempts {
        config.max_attempts = n;
    }
    if let Some(m) = model {
        config.llm.model = m;
    }

    let askdb = if mock_llm.is_empty() {
        AskDb::from_config(&config)?
    } else {
        config.validate()?;
        AskDb::new(
            PostgresDatabase::new(config.database.clone()),
            MockProvider::with_responses(mock_llm),
        )
        .with_max_attempts(config.max_attempts)
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        if interrupt(&flag) {
            std::process::exit(EXIT_INTERRUPTED);
        }
        eprintln!(
            "{}",
            "Cancelling after the current step. Press Ctrl-C again to quit now.".yellow()
        );
    })?;

    if !json_output {
        println!(
            "{} {} {}",
            "Asking".cyan().bold(),
            askdb.generator().config().model.white(),
            format!("(up to {} attempts)", askdb.max_attempts()).dimmed()
        );
    }

    let response = askdb.ask_with_cancel(&question, &cancel)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(response.is_success());
    }

    if verbose || !response.is_success() {
        println!();
        println!("{}", "Attempts:".yellow().bold());
        for attempt in &response.attempts {
            let label = format!("  #{}", attempt.index + 1);
            match &attempt.outcome {
                AttemptOutcome::Succeeded => println!("{} {} {}", label, "ok".green(), attempt.sql),
                AttemptOutcome::DbError { message } => {
                    println!("{} {} {}", label, "rejected".red(), attempt.sql);
                    println!("     {}", message.dimmed());
                }
                AttemptOutcome::ConnectionError { message } => {
                    println!("{} {} {}", label, "unreachable".red(), attempt.sql);
                    println!("     {}", message.dimmed());
                }
                AttemptOutcome::GenerationError { message } => {
                    println!("{} {} {}", label, "no sql".red(), message.dimmed())
                }
                AttemptOutcome::Pending => println!("{} {} {}", label, "pending".yellow(), attempt.sql),
            }
        }
    }

    println!();
    match response.status {
        ChatStatus::Success => {
            println!("{} {}", "SQL:".green().bold(), response.sql.white());
            if response.attempts_used > 0 {
                println!(
                    "{}",
                    format!("(corrected after {} rejected attempt(s))", response.attempts_used).dimmed()
                );
            }
            println!();
            print_rows(&response.rows);
        }
        ChatStatus::ConnectivityFailure => {
            println!(
                "{} {}",
                "Could not reach the model:".red().bold(),
                response.error_message.as_deref().unwrap_or_default()
            );
            if !response.sql.is_empty() {
                println!("Last SQL: {}", response.sql.white());
            }
        }
        ChatStatus::DatabaseUnavailable => {
            println!(
                "{} {}",
                "Could not reach the database:".red().bold(),
                response.error_message.as_deref().unwrap_or_default()
            );
            println!("Pending SQL: {}", response.sql.white());
        }
        ChatStatus::Exhausted => {
            println!(
                "{} {} attempts were rejected by the database.",
                "Gave up:".red().bold(),
                response.attempts_used
            );
            println!("Last SQL:   {}", response.sql.white());
            println!("Last error: {}", response.error_message.as_deref().unwrap_or_default());
        }
    }

    Ok(response.is_success())
}

/// Record a Ctrl-C. Returns true when cancellation was already pending, so
/// the caller should stop waiting for the current step.
fn interrupt(flag: &AtomicBool) -> bool {
    flag.swap(true, Ordering::SeqCst)
}
