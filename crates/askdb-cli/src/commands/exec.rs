//! Exec command - run SQL directly against the database.

use askdb::{AskDb, AskDbConfig, Execution};
use colored::Colorize;

use super::{CommandResult, print_rows};

pub fn run(sql: String, json_output: bool, _verbose: bool) -> CommandResult {
    let askdb = AskDb::from_config(&AskDbConfig::from_env())?;
    let execution = askdb.execute(&sql)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&execution)?);
        return Ok(execution.is_success());
    }

    match execution {
        Execution::Rows { rows } => print_rows(&rows),
        Execution::Completed { rows_affected } => {
            println!(
                "{} ({} rows affected)",
                "OK".green().bold(),
                rows_affected
            );
        }
        Execution::Failed { error } => {
            let code = error.code.as_deref().map(|c| format!(" [{}]", c)).unwrap_or_default();
            println!("{}{} {}", "Rejected".red().bold(), code, error.message);
            return Ok(false);
        }
    }

    Ok(true)
}
