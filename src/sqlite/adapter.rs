use std::path::Path;

use rusqlite::Connection;
use tracing::warn;

use crate::error::{Error, Result};
use crate::sqlite::result_set::SqliteResultSet;
use crate::sqlite::table::SqliteTable;
use crate::traits::{DatabaseAdapter, ResultSet, Table};

pub(crate) fn map_sqlite_error(error: rusqlite::Error) -> Error {
    Error::Query {
        message: error.to_string(),
        fatal: false,
    }
}

/// SQLite implementation of [`DatabaseAdapter`] over an embedded engine
/// connection. The connection handle is owned exclusively and closed on
/// drop.
pub struct SqliteAdapter {
    conn: Connection,
}

impl SqliteAdapter {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| Error::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    fn run_select(&mut self, sql: &str, params: &[&str]) -> Result<SqliteResultSet<'_>> {
        let statement = self.conn.prepare(sql).map_err(map_sqlite_error)?;
        let params = params.iter().map(|p| p.to_string()).collect();
        Ok(SqliteResultSet::new(statement, params))
    }
}

impl DatabaseAdapter for SqliteAdapter {
    fn table_names(&mut self) -> Vec<String> {
        let mut result_set = match self.run_select(
            "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name",
            &[],
        ) {
            Ok(result_set) => result_set,
            Err(error) => {
                warn!(%error, "listing tables failed");
                return Vec::new();
            }
        };

        let names = result_set
            .rows()
            .filter_map(|row| {
                row.get("name")
                    .and_then(|value| value.as_str())
                    .map(str::to_string)
            })
            .collect();

        if let Some(error) = result_set.stream_error() {
            warn!(%error, "listing tables ended early");
        }

        names
    }

    fn get_table<'a>(&'a mut self, name: &str) -> Result<Box<dyn Table + 'a>> {
        Ok(Box::new(SqliteTable::new(&self.conn, name)))
    }

    /// Runs the statement to exhaustion, then reports the connection's
    /// change counter.
    fn execute(&mut self, sql: &str) -> Result<u64> {
        let mut statement = self.conn.prepare(sql).map_err(map_sqlite_error)?;
        let mut rows = statement.query([]).map_err(map_sqlite_error)?;
        while rows.next().map_err(map_sqlite_error)?.is_some() {}
        drop(rows);
        drop(statement);
        Ok(self.conn.changes() as u64)
    }

    fn select<'a>(&'a mut self, sql: &str) -> Result<Box<dyn ResultSet + 'a>> {
        Ok(Box::new(self.run_select(sql, &[])?))
    }

    fn select_with_params<'a>(
        &'a mut self,
        sql: &str,
        params: &[&str],
    ) -> Result<Box<dyn ResultSet + 'a>> {
        Ok(Box::new(self.run_select(sql, params)?))
    }
}
