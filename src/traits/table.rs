use crate::error::Result;

/// A reference to a column of a named table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }
}

/// A lazily inspected table.
///
/// Methods take `&mut self` because listing columns may query the backend
/// through the owning adapter's connection.
pub trait Table {
    /// Column names, best-effort (empty on introspection failure).
    fn column_names(&mut self) -> Vec<String>;

    /// Look up a column by name.
    fn get_column(&mut self, name: &str) -> Result<ColumnRef>;
}
