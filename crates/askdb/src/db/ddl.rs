//! Structured schema edits for the no-code table editor.
//!
//! A [`DdlRequest`] names an action plus its parameters and turns into
//! exactly one DDL statement. Missing parameters are reported before any SQL
//! is built, and an unknown action name never reaches the database.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AskDbError, Result};

use super::{Execution, SqlExecutor};

/// A schema edit supported by the table editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DdlAction {
    /// Create a table with a serial `id` primary key.
    CreateTable,
    AddColumn,
    DropColumn,
    DropTable,
    RenameTable,
    RenameColumn,
    AlterColumnType,
    AddForeignKey,
    DropForeignKey,
}

impl DdlAction {
    pub const ALL: [DdlAction; 9] = [
        DdlAction::CreateTable,
        DdlAction::AddColumn,
        DdlAction::DropColumn,
        DdlAction::DropTable,
        DdlAction::RenameTable,
        DdlAction::RenameColumn,
        DdlAction::AlterColumnType,
        DdlAction::AddForeignKey,
        DdlAction::DropForeignKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DdlAction::CreateTable => "create_table",
            DdlAction::AddColumn => "add_column",
            DdlAction::DropColumn => "drop_column",
            DdlAction::DropTable => "drop_table",
            DdlAction::RenameTable => "rename_table",
            DdlAction::RenameColumn => "rename_column",
            DdlAction::AlterColumnType => "alter_column_type",
            DdlAction::AddForeignKey => "add_foreign_key",
            DdlAction::DropForeignKey => "drop_foreign_key",
        }
    }
}

impl FromStr for DdlAction {
    type Err = AskDbError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        DdlAction::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| AskDbError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for DdlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured schema edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdlRequest {
    pub action: DdlAction,
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    /// New table or column name for renames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references_column: Option<String>,
    /// Constraint name for foreign key edits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
}

impl DdlRequest {
    /// Create a request with only the table name set.
    pub fn new(action: DdlAction, table_name: impl Into<String>) -> Self {
        Self {
            action,
            table_name: table_name.into(),
            column_name: None,
            column_type: None,
            new_name: None,
            references_table: None,
            references_column: None,
            constraint_name: None,
        }
    }

    pub fn with_column(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    pub fn with_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = Some(column_type.into());
        self
    }

    pub fn with_new_name(mut self, name: impl Into<String>) -> Self {
        self.new_name = Some(name.into());
        self
    }

    pub fn with_reference(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references_table = Some(table.into());
        self.references_column = Some(column.into());
        self
    }

    pub fn with_constraint(mut self, name: impl Into<String>) -> Self {
        self.constraint_name = Some(name.into());
        self
    }

    /// Build the single DDL statement for this request.
    pub fn to_sql(&self) -> Result<String> {
        let table = self.require("table_name", Some(&self.table_name))?;

        let sql = match self.action {
            DdlAction::CreateTable => format!("CREATE TABLE {} (id SERIAL PRIMARY KEY);", table),
            DdlAction::AddColumn => {
                let column = self.require("column_name", self.column_name.as_ref())?;
                let column_type = self.require("column_type", self.column_type.as_ref())?;
                format!("ALTER TABLE {} ADD COLUMN {} {};", table, column, column_type)
            }
            DdlAction::DropColumn => {
                let column = self.require("column_name", self.column_name.as_ref())?;
                format!("ALTER TABLE {} DROP COLUMN {};", table, column)
            }
            DdlAction::DropTable => format!("DROP TABLE {};", table),
            DdlAction::RenameTable => {
                let new_name = self.require("new_name", self.new_name.as_ref())?;
                format!("ALTER TABLE {} RENAME TO {};", table, new_name)
            }
            DdlAction::RenameColumn => {
                let column = self.require("column_name", self.column_name.as_ref())?;
                let new_name = self.require("new_name", self.new_name.as_ref())?;
                format!("ALTER TABLE {} RENAME COLUMN {} TO {};", table, column, new_name)
            }
            DdlAction::AlterColumnType => {
                let column = self.require("column_name", self.column_name.as_ref())?;
                let column_type = self.require("column_type", self.column_type.as_ref())?;
                format!(
                    "ALTER TABLE {} ALTER COLUMN {} TYPE {} USING {}::{};",
                    table, column, column_type, column, column_type
                )
            }
            DdlAction::AddForeignKey => {
                let column = self.require("column_name", self.column_name.as_ref())?;
                let ref_table = self.require("references_table", self.references_table.as_ref())?;
                let ref_column =
                    self.require("references_column", self.references_column.as_ref())?;
                let constraint = self
                    .constraint_name
                    .clone()
                    .unwrap_or_else(|| format!("fk_{}_{}", table, column));
                format!(
                    "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({});",
                    table, constraint, column, ref_table, ref_column
                )
            }
            DdlAction::DropForeignKey => {
                let constraint = self.require("constraint_name", self.constraint_name.as_ref())?;
                format!("ALTER TABLE {} DROP CONSTRAINT {};", table, constraint)
            }
        };

        Ok(sql)
    }

    /// Build the statement and run it, returning the SQL that was executed.
    ///
    /// A rejected statement becomes [`AskDbError::Execution`].
    pub fn apply(&self, executor: &dyn SqlExecutor) -> Result<String> {
        let sql = self.to_sql()?;
        info!(action = %self.action, %sql, "executing DDL");

        match executor.execute(&sql)? {
            Execution::Failed { error } => Err(AskDbError::Execution(error)),
            _ => Ok(sql),
        }
    }

    fn require<'a>(&self, parameter: &'static str, value: Option<&'a String>) -> Result<&'a str> {
        match value.map(|v| v.trim()) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(AskDbError::MissingParameter {
                action: self.action.to_string(),
                parameter,
            }),
        }
    }
}
