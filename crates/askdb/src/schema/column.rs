//! Column definition.

use serde::{Deserialize, Serialize};

/// A column referenced by a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced table.
    pub table: String,
    /// Referenced column.
    pub column: String,
}

impl ForeignKey {
    /// Create a new foreign key reference.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// A single column as read from the database catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared type, uppercased (e.g. `INTEGER`, `CHARACTER VARYING`).
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether the column is part of the table's primary key.
    #[serde(rename = "isPk")]
    pub is_primary_key: bool,
    /// Whether the column accepts NULL.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Foreign key reference, when known.
    #[serde(default, rename = "fk", skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// Create a nullable, non-key column. The type is uppercased.
    pub fn new(name: impl Into<String>, data_type: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.as_ref().to_uppercase(),
            is_primary_key: false,
            nullable: true,
            foreign_key: None,
        }
    }

    /// Mark the column as (part of) the primary key.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    /// Set nullability.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Attach a foreign key reference.
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey::new(table, column));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_is_uppercased() {
        let col = Column::new("email", "character varying");
        assert_eq!(col.data_type, "CHARACTER VARYING");
        assert!(col.nullable);
        assert!(!col.is_primary_key);
    }

    #[test]
    fn test_serializes_with_frontend_keys() {
        let col = Column::new("user_id", "integer").references("users", "id");
        let json = serde_json::to_value(&col).unwrap();

        assert_eq!(json["type"], "INTEGER");
        assert_eq!(json["isPk"], false);
        assert_eq!(json["fk"]["table"], "users");
        assert_eq!(json["fk"]["column"], "id");
    }
}
