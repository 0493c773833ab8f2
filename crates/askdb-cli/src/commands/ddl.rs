//! Ddl command - structured schema edits.

use askdb::{AskDb, AskDbConfig, DdlAction, DdlRequest};
use colored::Colorize;

use super::CommandResult;

/// Flags for one schema edit.
pub struct DdlArgs {
    pub action: String,
    pub table: String,
    pub column: Option<String>,
    pub column_type: Option<String>,
    pub new_name: Option<String>,
    pub references_table: Option<String>,
    pub references_column: Option<String>,
    pub constraint: Option<String>,
}

impl DdlArgs {
    fn into_request(self) -> askdb::Result<DdlRequest> {
        let action: DdlAction = self.action.parse()?;
        Ok(DdlRequest {
            action,
            table_name: self.table,
            column_name: self.column,
            column_type: self.column_type,
            new_name: self.new_name,
            references_table: self.references_table,
            references_column: self.references_column,
            constraint_name: self.constraint,
        })
    }
}

pub fn run(args: DdlArgs, verbose: bool) -> CommandResult {
    // Validate before connecting so typos fail fast.
    let request = args.into_request()?;
    let sql = request.to_sql()?;
    if verbose {
        println!("{} {}", "SQL:".dimmed(), sql);
    }

    let askdb = AskDb::from_config(&AskDbConfig::from_env())?;
    askdb.apply_ddl(&request)?;

    println!("{} {}", "Applied".green().bold(), sql.white());
    Ok(true)
}
