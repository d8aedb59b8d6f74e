mod row;
mod sql_value;

pub use row::ResultRow;
pub use sql_value::{ScalarKind, SqlArray, SqlValue};
