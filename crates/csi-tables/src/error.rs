//! Error types for csi-tables.

use thiserror::Error;

use crate::model::Application;

/// Result type alias using [`TableError`]
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors establishing a connection to a host application.
///
/// Always fatal to the attempted operation; nothing is retried internally.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The vendor helper object could not be created (the application's
    /// automation interface is likely not registered on this machine).
    #[error("Failed to create {application} helper object: {message}")]
    Helper {
        application: Application,
        message: String,
    },

    /// No running instance was found, or no model is open in it.
    #[error(
        "Could not connect to a running {application} instance. \
         Ensure {application} is running and a model is open."
    )]
    NoRunningInstance { application: Application },

    /// A new instance could not be launched.
    #[error("Could not start a new {application} instance: {message}")]
    StartFailed {
        application: Application,
        message: String,
    },

    /// An automation call on the application object failed.
    #[error("{application} automation call failed: {message}")]
    Com {
        application: Application,
        message: String,
    },
}

/// Errors retrieving or reshaping a result table.
///
/// Host-reported failures (unrecognized names, unanalyzed model) surface
/// verbatim in [`TableError::Api`]. A table call either returns a complete
/// [`TableData`](crate::TableData) or fails with one of these; there are no
/// partial results.
#[derive(Debug, Error)]
pub enum TableError {
    /// The open model reports no tables at all (typically not yet analyzed).
    #[error("No tables were found in the open model")]
    NoTables,

    /// The requested table key is not among the tables the model reports.
    #[error("Failed to retrieve '{table_key}'. It was not found amongst the {available} tables.")]
    TableNotFound { table_key: String, available: usize },

    /// The flat value buffer does not divide evenly into rows.
    #[error(
        "Table '{table_key}' returned {values} values for {fields} fields, \
         which does not divide into whole rows"
    )]
    ShapeMismatch {
        table_key: String,
        fields: usize,
        values: usize,
    },

    /// The host's reported record count disagrees with the buffer size.
    #[error("Table '{table_key}' reported {reported} records but the buffer holds {computed}")]
    RecordCountMismatch {
        table_key: String,
        reported: usize,
        computed: usize,
    },

    /// A named column is not present in the table.
    #[error("Column '{0}' is not present in the table")]
    ColumnNotFound(String),

    /// A vendor API call returned a non-zero status code.
    #[error("{operation} returned non-zero code {code}")]
    NonZeroReturn { operation: &'static str, code: i32 },

    /// A host-reported failure, passed through verbatim.
    #[error("{0}")]
    Api(String),
}
