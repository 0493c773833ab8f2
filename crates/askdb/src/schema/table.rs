//! Table and snapshot definitions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AskDbError, Result};

use super::column::Column;

/// A table with its columns in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Columns, in the database's ordinal order.
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a new table.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Find the primary key column(s).
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_primary_key)
    }
}

/// The tables visible in the database's user schema at one point in time.
///
/// Table names are unique within a snapshot and column names are unique
/// within a table. Both are checked on construction, including when a
/// snapshot is deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Table>", into = "Vec<Table>")]
pub struct SchemaSnapshot {
    tables: Vec<Table>,
}

impl SchemaSnapshot {
    /// Build a snapshot, validating name uniqueness.
    pub fn new(tables: Vec<Table>) -> Result<Self> {
        let mut table_names = HashSet::new();
        for table in &tables {
            if !table_names.insert(table.name.as_str()) {
                return Err(AskDbError::Schema(format!(
                    "duplicate table '{}'",
                    table.name
                )));
            }

            let mut column_names = HashSet::new();
            for column in &table.columns {
                if !column_names.insert(column.name.as_str()) {
                    return Err(AskDbError::Schema(format!(
                        "duplicate column '{}' in table '{}'",
                        column.name, table.name
                    )));
                }
            }
        }

        Ok(Self { tables })
    }

    /// An empty snapshot (database with no user tables).
    pub fn empty() -> Self {
        Self { tables: Vec::new() }
    }

    /// Tables in snapshot order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Get all table names.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Get the number of tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Default for SchemaSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Vec<Table>> for SchemaSnapshot {
    type Error = AskDbError;

    fn try_from(tables: Vec<Table>) -> Result<Self> {
        Self::new(tables)
    }
}

impl From<SchemaSnapshot> for Vec<Table> {
    fn from(snapshot: SchemaSnapshot) -> Self {
        snapshot.tables
    }
}
