//! PostgreSQL implementation of the database capabilities.

use std::collections::{HashMap, HashSet};

use postgres::{Client, NoTls, SimpleQueryMessage};
use tracing::{debug, warn};

use crate::error::{AskDbError, Result};
use crate::schema::{Column, ForeignKey, SchemaSnapshot, Table};

use super::config::DatabaseConfig;
use super::split::split_statements;
use super::{DbError, Execution, Row, SchemaIntrospector, SqlExecutor};

const TABLES_SQL: &str = "
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_schema::text = $1
    ORDER BY table_name";

const COLUMNS_SQL: &str = "
    SELECT column_name::text, data_type::text, is_nullable::text
    FROM information_schema.columns
    WHERE table_schema::text = $1 AND table_name::text = $2
    ORDER BY ordinal_position";

const PRIMARY_KEYS_SQL: &str = "
    SELECT c.column_name::text
    FROM information_schema.table_constraints tc
    JOIN information_schema.constraint_column_usage ccu
        ON tc.constraint_schema = ccu.constraint_schema
        AND tc.constraint_name = ccu.constraint_name
    JOIN information_schema.columns c
        ON c.table_schema = tc.table_schema
        AND c.table_name = tc.table_name
        AND c.column_name = ccu.column_name
    WHERE tc.constraint_type = 'PRIMARY KEY'
        AND tc.table_schema::text = $1
        AND tc.table_name::text = $2";

/// One row per referencing column, paired with the referenced column at the
/// same position of the constraint's key.
const FOREIGN_KEYS_SQL: &str = "
    SELECT a.attname::text, ref_table.relname::text, ref_col.attname::text
    FROM pg_constraint c
    JOIN pg_class t ON t.oid = c.conrelid
    JOIN pg_namespace n ON n.oid = t.relnamespace
    CROSS JOIN LATERAL unnest(c.conkey, c.confkey) WITH ORDINALITY AS k(attnum, ref_attnum, ord)
    JOIN pg_attribute a ON a.attrelid = c.conrelid AND a.attnum = k.attnum
    JOIN pg_class ref_table ON ref_table.oid = c.confrelid
    JOIN pg_attribute ref_col ON ref_col.attrelid = c.confrelid AND ref_col.attnum = k.ref_attnum
    WHERE c.contype = 'f'
        AND n.nspname::text = $1
        AND t.relname::text = $2
    ORDER BY c.conname, k.ord";

/// A PostgreSQL database reached with a fresh connection per call.
///
/// Connections are never pooled or shared: each [`snapshot`] or [`execute`]
/// call connects, does its work and drops the client, which closes the
/// connection on every exit path. Statements run outside any explicit
/// transaction, so each one commits on its own.
///
/// [`snapshot`]: SchemaIntrospector::snapshot
/// [`execute`]: SqlExecutor::execute
pub struct PostgresDatabase {
    config: DatabaseConfig,
}

impl PostgresDatabase {
    /// Create a database handle. No connection is opened until first use.
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Create from `DB_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(DatabaseConfig::from_env())
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    fn connect(&self) -> std::result::Result<Client, postgres::Error> {
        self.config.to_pg_config().connect(NoTls)
    }

    fn read_snapshot(&self) -> std::result::Result<Vec<Table>, postgres::Error> {
        let mut client = self.connect()?;
        let schema = self.config.schema.as_str();

        let table_names: Vec<String> = client
            .query(TABLES_SQL, &[&schema])?
            .iter()
            .map(|row| row.get(0))
            .collect();

        let columns_stmt = client.prepare(COLUMNS_SQL)?;
        let pks_stmt = client.prepare(PRIMARY_KEYS_SQL)?;
        let fks_stmt = if self.config.discover_foreign_keys {
            Some(client.prepare(FOREIGN_KEYS_SQL)?)
        } else {
            None
        };

        let mut tables = Vec::with_capacity(table_names.len());
        for table_name in table_names {
            let params: [&(dyn postgres::types::ToSql + Sync); 2] = [&schema, &table_name];

            let primary_keys: HashSet<String> = client
                .query(&pks_stmt, &params)?
                .iter()
                .map(|row| row.get(0))
                .collect();

            let mut foreign_keys: HashMap<String, ForeignKey> = HashMap::new();
            if let Some(ref stmt) = fks_stmt {
                for row in client.query(stmt, &params)? {
                    let column: String = row.get(0);
                    foreign_keys
                        .entry(column)
                        .or_insert_with(|| ForeignKey::new(row.get::<_, String>(1), row.get::<_, String>(2)));
                }
            }

            let columns = client
                .query(&columns_stmt, &params)?
                .iter()
                .map(|row| {
                    let name: String = row.get(0);
                    let data_type: String = row.get(1);
                    let is_nullable: String = row.get(2);

                    let mut column = Column::new(name, data_type)
                        .with_nullable(is_nullable.eq_ignore_ascii_case("YES"));
                    column.is_primary_key = primary_keys.contains(&column.name);
                    column.foreign_key = foreign_keys.remove(&column.name);
                    column
                })
                .collect();

            tables.push(Table::new(table_name, columns));
        }

        Ok(tables)
    }
}

impl SchemaIntrospector for PostgresDatabase {
    fn snapshot(&self) -> Result<SchemaSnapshot> {
        let tables = self.read_snapshot().map_err(|e| {
            AskDbError::Introspection(format!(
                "Failed to read schema '{}' on {}:{}/{}: {}",
                self.config.schema, self.config.host, self.config.port, self.config.dbname, e
            ))
        })?;

        debug!(tables = tables.len(), schema = %self.config.schema, "introspected schema");
        SchemaSnapshot::new(tables)
    }
}

impl SqlExecutor for PostgresDatabase {
    /// Run each statement of `sql` in turn, each committing on its own.
    ///
    /// Stops at the first rejected statement; statements before it stay
    /// committed. Returns the rows of the last statement that produced a
    /// result set.
    fn execute(&self, sql: &str) -> Result<Execution> {
        let statements = split_statements(sql);
        if statements.is_empty() {
            return Ok(Execution::Failed {
                error: DbError::new("can't execute an empty query"),
            });
        }

        let mut client = self.connect().map_err(|e| {
            AskDbError::Connection(format!(
                "Failed to connect to {}:{}/{}: {}",
                self.config.host, self.config.port, self.config.dbname, e
            ))
        })?;

        let mut results = ResultCollector::default();
        for statement in &statements {
            debug!(sql = %statement, "executing");
            match client.simple_query(statement) {
                Ok(messages) => results.absorb(messages),
                Err(err) => {
                    let error = to_db_error(&err);
                    warn!(error = %error.message, "statement rejected");
                    return Ok(Execution::Failed { error });
                }
            }
        }

        Ok(results.finish())
    }
}

/// Folds simple-query messages from successive statements into one
/// [`Execution`]. The last result set wins; without any, affected-row counts
/// are summed.
#[derive(Default)]
struct ResultCollector {
    rows: Option<Vec<Row>>,
    rows_affected: u64,
}

impl ResultCollector {
    fn absorb(&mut self, messages: Vec<SimpleQueryMessage>) {
        let mut current: Option<Vec<Row>> = None;

        for message in messages {
            match message {
                SimpleQueryMessage::RowDescription(_) => current = Some(Vec::new()),
                SimpleQueryMessage::Row(row) => {
                    let values: Row = row
                        .columns()
                        .iter()
                        .enumerate()
                        .map(|(idx, col)| (col.name().to_string(), row.get(idx).map(str::to_string)))
                        .collect();
                    current.get_or_insert_with(Vec::new).push(values);
                }
                SimpleQueryMessage::CommandComplete(n) => match current.take() {
                    Some(rows) => self.rows = Some(rows),
                    None => self.rows_affected += n,
                },
                _ => {}
            }
        }
    }

    fn finish(self) -> Execution {
        match self.rows {
            Some(rows) => Execution::Rows { rows },
            None => Execution::Completed {
                rows_affected: self.rows_affected,
            },
        }
    }
}

/// Extract the server's error text, falling back to the client error message.
fn to_db_error(err: &postgres::Error) -> DbError {
    match err.as_db_error() {
        Some(db) => {
            let mut message = db.message().to_string();
            if let Some(detail) = db.detail() {
                message.push_str(&format!("\nDETAIL: {}", detail));
            }
            if let Some(hint) = db.hint() {
                message.push_str(&format!("\nHINT: {}", hint));
            }
            DbError::new(message).with_code(db.code().code())
        }
        None => DbError::new(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sql_is_rejected_without_connecting() {
        // Nothing listens on this port; an attempted connection would be Err.
        let mut config = DatabaseConfig::default();
        config.port = 1;
        let db = PostgresDatabase::new(config);

        let execution = db.execute("   \n").unwrap();
        assert!(matches!(execution, Execution::Failed { error } if error.message.contains("empty")));
    }

    #[test]
    fn test_unreachable_database_fails_introspection() {
        let mut config = DatabaseConfig::default();
        config.host = "127.0.0.1".to_string();
        config.port = 1;
        let db = PostgresDatabase::new(config);

        let err = db.snapshot().unwrap_err();
        assert!(matches!(err, AskDbError::Introspection(msg) if msg.contains("127.0.0.1:1")));
    }

    #[test]
    fn test_collector_sums_counts_across_statements() {
        let mut results = ResultCollector::default();
        results.absorb(vec![SimpleQueryMessage::CommandComplete(2)]);
        results.absorb(vec![SimpleQueryMessage::CommandComplete(3)]);

        assert_eq!(results.finish(), Execution::Completed { rows_affected: 5 });
    }

    #[test]
    fn test_comment_only_sql_is_rejected_without_connecting() {
        let mut config = DatabaseConfig::default();
        config.port = 1;
        let db = PostgresDatabase::new(config);

        let execution = db.execute("-- just a note\n;").unwrap();
        assert!(!execution.is_success());
    }

    #[test]
    fn test_unreachable_database_fails_execution_with_context() {
        let mut config = DatabaseConfig::default();
        config.host = "127.0.0.1".to_string();
        config.port = 1;
        let db = PostgresDatabase::new(config);

        let err = db.execute("SELECT 1;").unwrap_err();
        assert!(matches!(err, AskDbError::Connection(msg) if msg.contains("127.0.0.1:1")));
    }
}
