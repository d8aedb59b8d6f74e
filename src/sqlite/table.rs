use rusqlite::Connection;
use tracing::warn;

use crate::error::{Error, Result};
use crate::traits::{ColumnRef, Table};

/// A lazy per-table column lister backed by `PRAGMA table_info`.
pub struct SqliteTable<'conn> {
    conn: &'conn Connection,
    name: String,
}

impl<'conn> SqliteTable<'conn> {
    pub(crate) fn new(conn: &'conn Connection, name: &str) -> Self {
        Self {
            conn,
            name: name.to_string(),
        }
    }
}

impl Table for SqliteTable<'_> {
    fn column_names(&mut self) -> Vec<String> {
        let sql = format!("PRAGMA table_info('{}')", self.name.replace('\'', "''"));
        let mut statement = match self.conn.prepare(&sql) {
            Ok(statement) => statement,
            Err(error) => {
                warn!(table = %self.name, %error, "column introspection failed");
                return Vec::new();
            }
        };
        let mut rows = match statement.query([]) {
            Ok(rows) => rows,
            Err(error) => {
                warn!(table = %self.name, %error, "column introspection failed");
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        // table_info rows are (cid, name, type, notnull, dflt_value, pk).
        while let Ok(Some(row)) = rows.next() {
            if let Ok(name) = row.get::<_, String>(1) {
                names.push(name);
            }
        }
        names
    }

    fn get_column(&mut self, name: &str) -> Result<ColumnRef> {
        if self.column_names().iter().any(|column| column == name) {
            Ok(ColumnRef::new(self.name.clone(), name))
        } else {
            Err(Error::ColumnNotFound(format!("{}.{}", self.name, name)))
        }
    }
}
