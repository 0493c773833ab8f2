//! CLI command implementations.
//!
//! Each command returns `Ok(true)` when it did what was asked, `Ok(false)`
//! when it ran but the database or model did not produce an answer.

pub mod ask;
pub mod ddl;
pub mod exec;
pub mod init;
pub mod schema;

use askdb::Row;
use colored::Colorize;

pub type CommandResult = Result<bool, Box<dyn std::error::Error>>;

/// Display text for SQL NULL.
const NULL: &str = "NULL";

/// Print rows as an aligned table with a header line.
pub fn print_rows(rows: &[Row]) {
    let Some(first) = rows.first() else {
        println!("{}", "(0 rows)".dimmed());
        return;
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, value) in row.values().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell(value).chars().count());
            }
        }
    }

    let header = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:w$}", h, w = *w))
        .collect::<Vec<_>>()
        .join(" | ");
    println!("{}", header.bold());
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );

    for row in rows {
        let line = row
            .values()
            .zip(&widths)
            .map(|(v, w)| format!("{:w$}", cell(v), w = *w))
            .collect::<Vec<_>>()
            .join(" | ");
        println!("{}", line);
    }

    let noun = if rows.len() == 1 { "row" } else { "rows" };
    println!("{}", format!("({} {})", rows.len(), noun).dimmed());
}

fn cell(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NULL)
}
