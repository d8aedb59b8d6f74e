use std::collections::HashMap;

use crate::types::SqlValue;

static NULL_VALUE: SqlValue = SqlValue::Null;

/// A single row of a result set: column names in result order, values
/// keyed by name.
///
/// Built from a parallel pair of names and values. Column names are not
/// required to be unique in the input; a duplicated name keeps the
/// last value written under it. Positional access goes through the name
/// at that position, so name and index lookup always agree.
#[derive(Debug, Clone)]
pub struct ResultRow {
    column_names: Vec<String>,
    values: HashMap<String, SqlValue>,
}

impl ResultRow {
    pub fn new(column_names: Vec<String>, column_values: Vec<SqlValue>) -> Self {
        let values = column_names
            .iter()
            .cloned()
            .zip(column_values)
            .collect();
        Self {
            column_names,
            values,
        }
    }

    /// Look up a value by column name.
    ///
    /// `None` means the row has no such column; a present-but-null column
    /// yields `Some(&SqlValue::Null)`.
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        self.values.get(column_name)
    }

    /// Look up a value by position, delegating through the column name at
    /// that position.
    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        self.column_names.get(index).and_then(|name| self.get(name))
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn len(&self) -> usize {
        self.column_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.column_names.is_empty()
    }

    /// Iterate values in column order. Each call starts a fresh pass.
    pub fn values(&self) -> impl Iterator<Item = &SqlValue> + '_ {
        self.column_names
            .iter()
            .map(move |name| self.values.get(name).unwrap_or(&NULL_VALUE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ResultRow {
        ResultRow::new(
            vec!["id".to_string(), "name".to_string(), "deleted_at".to_string()],
            vec![
                SqlValue::Int4(1),
                SqlValue::Text("ada".to_string()),
                SqlValue::Null,
            ],
        )
    }

    #[test]
    fn test_get_by_name() {
        let row = sample_row();
        assert_eq!(row.get("id"), Some(&SqlValue::Int4(1)));
        assert_eq!(row.get("name"), Some(&SqlValue::Text("ada".to_string())));
    }

    #[test]
    fn test_absent_column_is_distinct_from_null_column() {
        let row = sample_row();
        assert_eq!(row.get("deleted_at"), Some(&SqlValue::Null));
        assert_eq!(row.get("no_such_column"), None);
    }

    #[test]
    fn test_get_by_index_agrees_with_name_lookup() {
        let row = sample_row();
        assert_eq!(row.get_index(0), row.get("id"));
        assert_eq!(row.get_index(2), row.get("deleted_at"));
        assert_eq!(row.get_index(3), None);
    }

    #[test]
    fn test_values_iterate_in_column_order_and_restart() {
        let row = sample_row();
        let first: Vec<&SqlValue> = row.values().collect();
        let second: Vec<&SqlValue> = row.values().collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first[0], &SqlValue::Int4(1));
        assert_eq!(first[2], &SqlValue::Null);
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_column_name_keeps_last_value() {
        let row = ResultRow::new(
            vec!["a".to_string(), "a".to_string()],
            vec![SqlValue::Int4(1), SqlValue::Int4(2)],
        );
        assert_eq!(row.get("a"), Some(&SqlValue::Int4(2)));
        // Both positions resolve through the same name.
        assert_eq!(row.get_index(0), Some(&SqlValue::Int4(2)));
        assert_eq!(row.get_index(1), Some(&SqlValue::Int4(2)));
        let all: Vec<&SqlValue> = row.values().collect();
        assert_eq!(all, vec![&SqlValue::Int4(2), &SqlValue::Int4(2)]);
    }
}
