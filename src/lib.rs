//! sqlbridge - one client-side contract over heterogeneous SQL engines
//!
//! A PostgreSQL wire-protocol client and an embedded SQLite engine behind
//! a single polymorphic surface: connect, execute statements, and stream
//! typed rows without caring which backend answers. Column values decode
//! through a per-connection, lazily populated type registry; result sets
//! come back either materialized or as single-row cursors behind the same
//! lazy row sequence.
//!
//! # Example
//! ```ignore
//! use sqlbridge::pg::PostgresAdapter;
//! use sqlbridge::{DatabaseAdapter, SqlValue};
//!
//! let mut adapter = PostgresAdapter::connect("host=localhost user=postgres")?;
//!
//! println!("Tables: {:?}", adapter.table_names());
//!
//! let mut result_set = adapter.select("select usename, usesysid from pg_user")?;
//! for row in result_set.rows() {
//!     println!("{:?} {:?}", row.get("usename"), row.get("usesysid"));
//! }
//! // Cursor-mode sequences have no inline error channel; check afterwards.
//! if let Some(error) = result_set.stream_error() {
//!     eprintln!("stream ended early: {error}");
//! }
//! ```

pub mod error;
pub mod pg;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export main types for convenient access
pub use error::{Error, Result};
pub use traits::{ColumnRef, DatabaseAdapter, ResultSet, Table};
pub use types::{ResultRow, ScalarKind, SqlArray, SqlValue};
