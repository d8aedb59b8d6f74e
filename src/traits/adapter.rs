use crate::error::Result;
use crate::traits::{ResultSet, Table};

/// The uniform contract both backends satisfy.
///
/// Implementations own their backend connection handle exclusively. All
/// methods take `&mut self`: one statement is in flight per connection at
/// a time, and a streaming [`ResultSet`] borrows the adapter until it is
/// dropped, so starting a new statement while a cursor is open does not
/// compile.
pub trait DatabaseAdapter {
    /// Names of user tables, best-effort. Failures are swallowed into an
    /// empty list (logged, not propagated).
    fn table_names(&mut self) -> Vec<String>;

    /// Look up a table by name.
    fn get_table<'a>(&'a mut self, name: &str) -> Result<Box<dyn Table + 'a>>;

    /// Run a statement to completion and return the affected-row count.
    fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Run a query and return its result set, streaming where the backend
    /// supports incremental fetch, materialized otherwise.
    fn select<'a>(&'a mut self, sql: &str) -> Result<Box<dyn ResultSet + 'a>>;

    /// Like [`select`](Self::select), with positional text parameters.
    fn select_with_params<'a>(
        &'a mut self,
        sql: &str,
        params: &[&str],
    ) -> Result<Box<dyn ResultSet + 'a>>;
}
