/// The scalar kinds a backend type name can register as.
///
/// These are the kinds the PostgreSQL text protocol knows how to cast
/// bidirectionally; see `pg::cast` for the decode/encode rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Text,
    Int2,
    Int4,
    Int8,
    Oid,
}

/// A decoded array column: the element kind plus the elements in order.
/// Elements are scalars of `element_kind`, or `SqlValue::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlArray {
    pub element_kind: ScalarKind,
    pub elements: Vec<SqlValue>,
}

/// A column value in a driver-agnostic, closed representation.
///
/// `Null` is a real value here: a row can answer "present but null"
/// (`Some(&SqlValue::Null)`) distinctly from "no such column" (`None`).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Oid(u32),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Array(SqlArray),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Borrow the text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Widen any integer variant to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int2(v) => Some(i64::from(*v)),
            SqlValue::Int4(v) => Some(i64::from(*v)),
            SqlValue::Int8(v) => Some(*v),
            SqlValue::Oid(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&SqlArray> {
        match self {
            SqlValue::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i16> for SqlValue {
    fn from(value: i16) -> Self {
        SqlValue::Int2(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int4(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int8(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_into_null() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(7)), SqlValue::Int4(7));
    }

    #[test]
    fn test_as_i64_widens_all_integer_kinds() {
        assert_eq!(SqlValue::Int2(3).as_i64(), Some(3));
        assert_eq!(SqlValue::Int4(3).as_i64(), Some(3));
        assert_eq!(SqlValue::Int8(3).as_i64(), Some(3));
        assert_eq!(SqlValue::Oid(3).as_i64(), Some(3));
        assert_eq!(SqlValue::Text("3".into()).as_i64(), None);
    }

    #[test]
    fn test_null_is_distinct_from_empty_text() {
        assert!(SqlValue::Null.is_null());
        assert!(!SqlValue::Text(String::new()).is_null());
        assert_ne!(SqlValue::Null, SqlValue::Text(String::new()));
    }
}
