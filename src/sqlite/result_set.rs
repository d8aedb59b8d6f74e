use rusqlite::types::ValueRef;
use rusqlite::{Rows, Statement};

use crate::error::Error;
use crate::sqlite::adapter::map_sqlite_error;
use crate::traits::ResultSet;
use crate::types::{ResultRow, SqlValue};

/// A SQLite result set.
///
/// Owns the prepared statement for the query (finalized on drop) and
/// steps it one row per pull: SQLite results are always cursors, so
/// `row_count` reports 0 and the column set comes from the statement.
/// Each `rows()` call re-runs the query from the start.
pub struct SqliteResultSet<'conn> {
    statement: Statement<'conn>,
    params: Vec<String>,
    column_names: Vec<String>,
    error: Option<Error>,
}

impl<'conn> SqliteResultSet<'conn> {
    pub(crate) fn new(statement: Statement<'conn>, params: Vec<String>) -> Self {
        let column_names = statement
            .column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        Self {
            statement,
            params,
            column_names,
            error: None,
        }
    }
}

impl ResultSet for SqliteResultSet<'_> {
    fn row_count(&self) -> usize {
        0
    }

    fn column_names(&self) -> Vec<String> {
        self.column_names.clone()
    }

    fn rows(&mut self) -> Box<dyn Iterator<Item = ResultRow> + '_> {
        self.error = None;
        let Self {
            statement,
            params,
            column_names,
            error,
        } = self;

        match statement.query(rusqlite::params_from_iter(params.iter())) {
            Ok(rows) => Box::new(SqliteRows {
                rows: Some(rows),
                column_names,
                error,
            }),
            Err(query_error) => {
                *error = Some(map_sqlite_error(query_error));
                Box::new(SqliteRows {
                    rows: None,
                    column_names,
                    error,
                })
            }
        }
    }

    fn stream_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }
}

struct SqliteRows<'a> {
    rows: Option<Rows<'a>>,
    column_names: &'a [String],
    error: &'a mut Option<Error>,
}

impl Iterator for SqliteRows<'_> {
    type Item = ResultRow;

    fn next(&mut self) -> Option<ResultRow> {
        let rows = self.rows.as_mut()?;
        match rows.next() {
            Ok(Some(row)) => Some(build_row(self.column_names, row)),
            Ok(None) => {
                self.rows = None;
                None
            }
            Err(step_error) => {
                *self.error = Some(map_sqlite_error(step_error));
                self.rows = None;
                None
            }
        }
    }
}

fn build_row(column_names: &[String], row: &rusqlite::Row<'_>) -> ResultRow {
    let values = (0..column_names.len())
        .map(|index| {
            row.get_ref(index)
                .map(value_from_sqlite)
                .unwrap_or(SqlValue::Null)
        })
        .collect();
    ResultRow::new(column_names.to_vec(), values)
}

fn value_from_sqlite(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => SqlValue::Int8(v),
        ValueRef::Real(v) => SqlValue::Real(v),
        ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).to_string()),
        ValueRef::Blob(bytes) => SqlValue::Blob(bytes.to_vec()),
    }
}
