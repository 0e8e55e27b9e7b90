//! Error types for the catalog crate.

use thiserror::Error;

/// Errors that can occur while ingesting and validating the catalog
/// and rating tables.
///
/// Construction is all-or-nothing: any of these aborts the load, and the
/// variant identifies which table and which invariant was violated.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row in a CSV file couldn't be parsed
    #[error("CSV parse error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// The same movie id appeared twice in the catalog table
    #[error("Duplicate movie id {id} in catalog")]
    DuplicateMovieId { id: u32 },

    /// A table was empty after ingestion
    #[error("Empty table: {table}")]
    EmptyTable { table: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
