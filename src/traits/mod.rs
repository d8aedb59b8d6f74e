mod adapter;
mod result_set;
mod table;

pub use adapter::DatabaseAdapter;
pub use result_set::ResultSet;
pub use table::{ColumnRef, Table};
