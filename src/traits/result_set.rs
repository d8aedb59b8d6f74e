use crate::error::Error;
use crate::types::ResultRow;

/// A finite sequence of rows produced by one query.
///
/// Two shapes satisfy this: a materialized snapshot (row count and columns
/// known up front, rows decoded lazily by index) and a streaming cursor
/// (one backend round-trip per row; `row_count` stays 0).
pub trait ResultSet {
    /// Number of rows. In streaming mode the count is unknown and reports
    /// as 0 until the sequence is exhausted.
    fn row_count(&self) -> usize;

    /// Column names in result order. Empty in streaming mode, where the
    /// descriptor arrives with each row.
    fn column_names(&self) -> Vec<String>;

    /// A lazy, single-pass iterator over the rows.
    fn rows(&mut self) -> Box<dyn Iterator<Item = ResultRow> + '_>;

    /// The error that ended a streaming iteration, if any.
    ///
    /// The iterator interface has no per-row error channel, so a cursor
    /// that dies mid-stream simply ends; callers must consult this slot
    /// afterwards to tell "exhausted" from "aborted".
    fn stream_error(&self) -> Option<&Error>;
}
