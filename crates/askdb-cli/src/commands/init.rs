//! Init command - create the sample users table.

use askdb::{AskDb, AskDbConfig};
use colored::Colorize;

use super::CommandResult;

pub fn run(_verbose: bool) -> CommandResult {
    let config = AskDbConfig::from_env();
    let askdb = AskDb::from_config(&config)?;
    askdb.seed()?;

    println!(
        "{} sample table {} in {}",
        "Ready:".green().bold(),
        "users".white().bold(),
        config.database.dbname
    );
    println!(
        "Try {}",
        "askdb ask \"show all users\"".cyan().bold()
    );

    Ok(true)
}
