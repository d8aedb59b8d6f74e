use crate::error::Result;

/// Result status codes as the PostgreSQL client library reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    EmptyQuery,
    CommandOk,
    TuplesOk,
    SingleTuple,
    CopyOut,
    CopyIn,
    CopyBoth,
    BadResponse,
    NonfatalError,
    FatalError,
    Unknown(i32),
}

/// One backend result buffer.
///
/// The box owns the buffer: dropping it releases the backend resource,
/// exactly once. Values come back in their text wire form; `None` is SQL
/// null, distinct from an empty string.
pub trait PgResultHandle {
    fn status(&self) -> ExecStatus;

    /// Affected-row count for command results, 0 when not applicable.
    fn command_tuples(&self) -> u64;

    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    fn column_name(&self, index: usize) -> Option<&str>;

    /// The backend-assigned type identifier of a column, 0 when unknown.
    fn column_type_oid(&self, index: usize) -> u32;

    fn value(&self, row: usize, column: usize) -> Option<&str>;
}

/// The statement transport the adapter drives.
///
/// This is the minimal capability set the adapter needs from a PostgreSQL
/// client library: send a statement, poll results until `None`, optionally
/// switch the pending result stream to single-row delivery, read the
/// connection's current error message, and escape string literals.
pub trait PgTransport {
    fn send_query(&mut self, sql: &str) -> Result<()>;

    /// Send with positional text-format parameters (`$1`, `$2`, ...).
    fn send_query_params(&mut self, sql: &str, params: &[&str]) -> Result<()>;

    /// Switch the just-sent statement to single-row delivery. Returns
    /// false when the transport cannot, in which case the caller falls
    /// back to draining the materialized result.
    fn set_single_row_mode(&mut self) -> bool;

    /// Next pending result for the current statement, `None` once the
    /// statement is fully drained and the connection is reusable.
    fn next_result(&mut self) -> Option<Box<dyn PgResultHandle>>;

    /// Human-readable message for the most recent failure.
    fn error_message(&mut self) -> String;

    /// Escape a string for inclusion in a single-quoted SQL literal.
    fn escape_literal(&mut self, raw: &str) -> Result<String>;
}
