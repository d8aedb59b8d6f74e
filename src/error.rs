use thiserror::Error;

/// Error type for sqlbridge operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Empty query string")]
    EmptyQuery,

    #[error("Backend returned no results")]
    NoResults,

    #[error("Malformed response from backend")]
    BadResponse,

    #[error("Query failed: {message}")]
    Query { message: String, fatal: bool },

    #[error("Could not send statement: {0}")]
    Send(String),

    #[error("String escaping failed: {0}")]
    StringEscaping(String),

    #[error("Unknown result status code: {0}")]
    UnknownStatus(i32),

    #[error("Not implemented for this backend")]
    Unimplemented,

    #[error("Not connected")]
    NotConnected,

    #[error("Column not found: {0}")]
    ColumnNotFound(String),
}

/// Result type alias for sqlbridge operations
pub type Result<T> = std::result::Result<T, Error>;
