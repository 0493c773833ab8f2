//! Error types for the askdb library.

use thiserror::Error;

use crate::db::DbError;

/// Main error type for askdb operations.
///
/// Database rejections of generated SQL are not errors: they are returned as
/// [`DbError`] data so the correction loop can feed them back for repair. An
/// unreachable generation backend or database during a question is reported
/// through the loop's outcome as well.
#[derive(Debug, Error)]
pub enum AskDbError {
    /// The database metadata could not be read.
    #[error("Introspection error: {0}")]
    Introspection(String),

    /// The database could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement built by the DDL tool was rejected by the database.
    #[error("Execution error: {0}")]
    Execution(DbError),

    /// The DDL tool was asked for an action it does not know.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// A DDL action is missing one of its required parameters.
    #[error("Missing parameter '{parameter}' for action '{action}'")]
    MissingParameter {
        action: String,
        parameter: &'static str,
    },

    /// A schema snapshot violated its uniqueness invariants.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller abandoned the request.
    #[error("Request cancelled")]
    Cancelled,
}

/// Result type alias for askdb operations.
pub type Result<T> = std::result::Result<T, AskDbError>;
