//! Rendering a schema snapshot as prompt context.

use super::column::Column;
use super::table::{SchemaSnapshot, Table};

/// Render a snapshot as `CREATE TABLE` statements for a generation prompt.
///
/// Tables appear in snapshot order and columns in catalog order, so the same
/// snapshot always renders to the same bytes. Statements are separated by a
/// blank line. An empty snapshot renders to an empty string.
pub fn render_context(snapshot: &SchemaSnapshot) -> String {
    snapshot
        .tables()
        .iter()
        .map(render_table)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_table(table: &Table) -> String {
    let columns = table
        .columns
        .iter()
        .map(render_column)
        .collect::<Vec<_>>()
        .join(", ");

    format!("CREATE TABLE {} (\n    {}\n);", table.name, columns)
}

fn render_column(column: &Column) -> String {
    let mut def = format!("{} {}", column.name, column.data_type);
    if column.is_primary_key {
        def.push_str(" PRIMARY KEY");
    }
    if let Some(ref fk) = column.foreign_key {
        def.push_str(&format!(" REFERENCES {}({})", fk.table, fk.column));
    }
    def
}
