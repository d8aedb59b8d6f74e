use std::collections::HashMap;

use crate::types::{ScalarKind, SqlValue};

/// Decode a scalar from its text wire form. `None` when the text does not
/// parse as the kind; callers treat that as a null value.
pub fn decode_scalar(kind: ScalarKind, raw: &str) -> Option<SqlValue> {
    match kind {
        ScalarKind::Bool => match raw {
            "t" => Some(SqlValue::Bool(true)),
            "f" => Some(SqlValue::Bool(false)),
            _ => None,
        },
        ScalarKind::Text => Some(SqlValue::Text(raw.to_string())),
        ScalarKind::Int2 => raw.parse::<i16>().ok().map(SqlValue::Int2),
        ScalarKind::Int4 => raw.parse::<i32>().ok().map(SqlValue::Int4),
        ScalarKind::Int8 => raw.parse::<i64>().ok().map(SqlValue::Int8),
        ScalarKind::Oid => raw.parse::<u32>().ok().map(SqlValue::Oid),
    }
}

/// Encode a scalar to its text wire form: booleans as `t`/`f`, integers
/// as canonical decimal, text verbatim.
///
/// Non-scalar values (nulls, arrays, the SQLite-only kinds) have no
/// scalar text form and encode as an empty string; array serialization
/// handles nulls itself.
pub fn encode_scalar(value: &SqlValue) -> String {
    match value {
        SqlValue::Bool(true) => "t".to_string(),
        SqlValue::Bool(false) => "f".to_string(),
        SqlValue::Text(s) => s.clone(),
        SqlValue::Int2(v) => v.to_string(),
        SqlValue::Int4(v) => v.to_string(),
        SqlValue::Int8(v) => v.to_string(),
        SqlValue::Oid(v) => v.to_string(),
        SqlValue::Real(v) => v.to_string(),
        SqlValue::Null
        | SqlValue::Blob(_)
        | SqlValue::Array(_) => String::new(),
    }
}

/// Name-keyed registry of castable scalar kinds.
///
/// Unregistered names are deliberately not an error: a column whose type
/// has no registered cast decodes as raw text, so decoding never blocks
/// on an unmapped type.
#[derive(Debug, Clone)]
pub struct CastRegistry {
    by_name: HashMap<String, ScalarKind>,
}

impl CastRegistry {
    /// Registry pre-populated with the built-in backend type names.
    pub fn with_builtins() -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("bool".to_string(), ScalarKind::Bool);
        by_name.insert("text".to_string(), ScalarKind::Text);
        by_name.insert("name".to_string(), ScalarKind::Text);
        by_name.insert("int2".to_string(), ScalarKind::Int2);
        by_name.insert("int4".to_string(), ScalarKind::Int4);
        by_name.insert("int8".to_string(), ScalarKind::Int8);
        by_name.insert("oid".to_string(), ScalarKind::Oid);
        Self { by_name }
    }

    pub fn register(&mut self, type_name: &str, kind: ScalarKind) {
        self.by_name.insert(type_name.to_string(), kind);
    }

    pub fn kind_for(&self, type_name: &str) -> Option<ScalarKind> {
        self.by_name.get(type_name).copied()
    }

    pub fn registered_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_name.keys().map(|s| s.as_str())
    }

    /// Decode through the registered kind for `type_name`, falling back to
    /// raw text for unregistered names.
    pub fn decode(&self, type_name: &str, raw: &str) -> Option<SqlValue> {
        match self.kind_for(type_name) {
            Some(kind) => decode_scalar(kind, raw),
            None => Some(SqlValue::Text(raw.to_string())),
        }
    }
}
