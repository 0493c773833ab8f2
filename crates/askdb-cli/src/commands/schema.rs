//! Schema command - show the live database schema.

use askdb::{AskDb, AskDbConfig, render_context};
use colored::Colorize;

use super::CommandResult;

pub fn run(json_output: bool, context: bool, _verbose: bool) -> CommandResult {
    let askdb = AskDb::from_config(&AskDbConfig::from_env())?;
    let snapshot = askdb.schema()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(true);
    }

    if context {
        println!("{}", render_context(&snapshot));
        return Ok(true);
    }

    if snapshot.is_empty() {
        println!("{}", "No tables found.".yellow());
        println!("Run {} to create a sample table.", "askdb init".cyan().bold());
        return Ok(true);
    }

    println!(
        "{} {}",
        snapshot.table_count().to_string().white().bold(),
        "tables".cyan().bold()
    );

    for table in snapshot.tables() {
        println!();
        println!("{}", table.name.yellow().bold());
        for col in &table.columns {
            let mut notes = Vec::new();
            if col.is_primary_key {
                notes.push("primary key".to_string());
            }
            if !col.nullable {
                notes.push("not null".to_string());
            }
            if let Some(ref fk) = col.foreign_key {
                notes.push(format!("-> {}.{}", fk.table, fk.column));
            }
            println!(
                "  {:24} {:28} {}",
                col.name,
                col.data_type,
                notes.join(", ").dimmed()
            );
        }
    }

    Ok(true)
}
