//! Database bootstrap error types

use thiserror::Error;

/// Exit code used when no database connection could be established
pub const FATAL_EXIT_CODE: i32 = 1;

/// Errors that can occur while establishing the database connection
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// No primary URI configured
    #[error("No database URI configured")]
    MissingUri,

    /// The URI could not be understood
    #[error("Invalid database URI: {0}")]
    InvalidUri(String),

    /// The endpoint did not answer within the connect timeout
    #[error("Timed out after {timeout_ms}ms connecting to {host}")]
    Timeout { host: String, timeout_ms: u64 },

    /// The endpoint refused or dropped the connection
    #[error("Failed to connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// SQLite open or query failed
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The ephemeral instance could not be started
    #[error("Failed to provision ephemeral database: {0}")]
    Provision(String),

    /// Both the primary and the fallback failed
    #[error("Primary failed ({primary}); fallback failed ({fallback})")]
    Unrecoverable {
        primary: Box<DatabaseError>,
        fallback: Box<DatabaseError>,
    },
}

impl DatabaseError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        FATAL_EXIT_CODE
    }
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
