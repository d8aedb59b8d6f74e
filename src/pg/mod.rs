//! PostgreSQL backend: statement transport seam, typed value casting,
//! per-connection type resolution, and the two result-set shapes.

mod adapter;
pub mod array;
pub mod cast;
mod driver;
pub mod protocol;
mod result_set;
mod scripted;
mod type_map;

pub use adapter::PostgresAdapter;
pub use driver::PostgresTransport;
pub use result_set::PgResultSet;
pub use scripted::{RecordedQuery, ReleaseLog, ScriptedResult, ScriptedTransport};
pub use type_map::{PgType, TypeMap};
