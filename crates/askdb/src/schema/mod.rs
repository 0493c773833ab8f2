//! Schema types for representing live database structure.

mod column;
mod context;
mod table;

pub use column::{Column, ForeignKey};
pub use context::render_context;
pub use table::{SchemaSnapshot, Table};
