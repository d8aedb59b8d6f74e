use tracing::warn;

use crate::error::{Error, Result};
use crate::pg::array;
use crate::pg::cast::decode_scalar;
use crate::pg::protocol::{ExecStatus, PgResultHandle, PgTransport};
use crate::pg::result_set::PgResultSet;
use crate::pg::type_map::{PgType, TypeMap};
use crate::traits::{DatabaseAdapter, ResultSet, Table};
use crate::types::{ResultRow, ScalarKind, SqlArray, SqlValue};

/// PostgreSQL implementation of [`DatabaseAdapter`], generic over the
/// statement transport.
///
/// Owns the transport (and through it the connection handle) and the
/// per-connection type resolution map.
pub struct PostgresAdapter<T: PgTransport> {
    pub(crate) transport: T,
    type_map: TypeMap,
}

impl<T: PgTransport> PostgresAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            type_map: TypeMap::new(),
        }
    }

    /// Borrow the underlying transport, mainly for inspection in tests.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Register a cast for a named backend type and eagerly resolve its
    /// type identifiers through the catalog.
    pub fn register_type(&mut self, type_name: &str, kind: ScalarKind) -> Result<()> {
        self.type_map.register(type_name, kind);
        self.populate_types_by_name(&[type_name])
    }

    /// Escape a string for inclusion in a single-quoted SQL literal.
    pub fn escape_string(&mut self, raw: &str) -> Result<String> {
        self.transport.escape_literal(raw)
    }

    /// Drain the transport to the last pending result. Intermediate
    /// results are released as they are replaced.
    fn last_result(&mut self) -> Result<Box<dyn PgResultHandle>> {
        let mut last = None;
        while let Some(result) = self.transport.next_result() {
            last = Some(result);
        }
        last.ok_or(Error::NoResults)
    }

    /// Classify a result's status, turning the failure statuses into
    /// typed errors. The handle is dropped (released) on the error paths.
    pub(crate) fn classify(
        &mut self,
        result: Box<dyn PgResultHandle>,
    ) -> Result<Box<dyn PgResultHandle>> {
        match result.status() {
            ExecStatus::EmptyQuery => Err(Error::EmptyQuery),
            ExecStatus::CommandOk
            | ExecStatus::TuplesOk
            | ExecStatus::SingleTuple
            | ExecStatus::CopyOut
            | ExecStatus::CopyIn
            | ExecStatus::CopyBoth => Ok(result),
            ExecStatus::BadResponse => Err(Error::BadResponse),
            ExecStatus::NonfatalError | ExecStatus::FatalError => {
                let fatal = result.status() == ExecStatus::FatalError;
                Err(Error::Query {
                    message: self.transport.error_message(),
                    fatal,
                })
            }
            ExecStatus::Unknown(code) => Err(Error::UnknownStatus(code)),
        }
    }

    fn execute_inner(&mut self, sql: &str) -> Result<u64> {
        self.transport.send_query(sql)?;
        let result = self.last_result()?;
        let result = self.classify(result)?;
        Ok(result.command_tuples())
    }

    fn select_inner(&mut self, sql: &str, params: Option<&[&str]>) -> Result<PgResultSet<'_, T>> {
        match params {
            None => self.transport.send_query(sql)?,
            Some(params) => self.transport.send_query_params(sql, params)?,
        }

        if self.transport.set_single_row_mode() {
            Ok(PgResultSet::streaming(self))
        } else {
            let result = self.last_result()?;
            let result = self.classify(result)?;
            Ok(PgResultSet::materialized(self, result))
        }
    }

    /// Resolve a type identifier, optionally issuing one catalog lookup.
    ///
    /// An identifier that has been looked up once is never looked up
    /// again on this connection, resolved or not.
    pub(crate) fn type_for_oid(&mut self, oid: u32, query_if_missing: bool) -> Option<PgType> {
        if let Some(resolved) = self.type_map.lookup(oid) {
            return Some(resolved);
        }

        if query_if_missing && self.type_map.mark_queried(oid) {
            if let Err(error) = self.populate_types_by_oid(&[oid]) {
                warn!(oid, %error, "type catalog lookup failed");
                return None;
            }
            return self.type_map.lookup(oid);
        }

        None
    }

    /// Decode one column value through the resolved type, falling back to
    /// raw text when the type is unresolved.
    pub(crate) fn cast_value(&mut self, oid: u32, raw: &str, query_if_missing: bool) -> SqlValue {
        match self.type_for_oid(oid, query_if_missing) {
            Some(PgType::Scalar(kind)) => decode_scalar(kind, raw).unwrap_or(SqlValue::Null),
            Some(PgType::Array(kind)) => SqlValue::Array(SqlArray {
                element_kind: kind,
                elements: array::parse(raw, kind),
            }),
            None => SqlValue::Text(raw.to_string()),
        }
    }

    pub(crate) fn build_row(
        &mut self,
        result: &dyn PgResultHandle,
        row_index: usize,
        query_if_missing: bool,
    ) -> ResultRow {
        let column_count = result.column_count();
        let mut names = Vec::with_capacity(column_count);
        let mut values = Vec::with_capacity(column_count);

        for column in 0..column_count {
            names.push(result.column_name(column).unwrap_or("").to_string());
            let value = match result.value(row_index, column) {
                None => SqlValue::Null,
                Some(raw) => self.cast_value(result.column_type_oid(column), raw, query_if_missing),
            };
            values.push(value);
        }

        ResultRow::new(names, values)
    }

    fn populate_types_by_oid(&mut self, oids: &[u32]) -> Result<()> {
        let list = oids
            .iter()
            .map(|oid| oid.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.populate_types(&format!("t.oid IN ({list})"))
    }

    fn populate_types_by_name(&mut self, type_names: &[&str]) -> Result<()> {
        let mut quoted = Vec::with_capacity(type_names.len());
        for name in type_names {
            let escaped = self.transport.escape_literal(name)?;
            quoted.push(format!("'{escaped}'"));
        }
        self.populate_types(&format!("t.typname IN ({})", quoted.join(",")))
    }

    /// Run one catalog query and fold every returned row into the type
    /// map. Values are read raw here; casting the catalog's own columns
    /// would recurse into resolution.
    fn populate_types(&mut self, where_clause: &str) -> Result<()> {
        let sql = format!(
            "SELECT t.oid, t.typname, t.typelem, t.typarray FROM pg_type AS t WHERE {where_clause}"
        );
        self.transport.send_query(&sql)?;
        let result = self.last_result()?;
        let result = self.classify(result)?;

        let oid_column = column_index(result.as_ref(), "oid");
        let name_column = column_index(result.as_ref(), "typname");
        let (Some(oid_column), Some(name_column)) = (oid_column, name_column) else {
            return Err(Error::BadResponse);
        };
        let elem_column = column_index(result.as_ref(), "typelem");
        let array_column = column_index(result.as_ref(), "typarray");

        for row in 0..result.row_count() {
            let oid = result
                .value(row, oid_column)
                .and_then(|raw| raw.parse::<u32>().ok());
            let Some(oid) = oid else { continue };
            let Some(type_name) = result.value(row, name_column) else {
                continue;
            };
            let typelem = catalog_oid(result.as_ref(), row, elem_column);
            let typarray = catalog_oid(result.as_ref(), row, array_column);
            self.type_map
                .absorb_catalog_row(oid, type_name, typelem, typarray);
        }

        Ok(())
    }

    fn table_names_inner(&mut self) -> Vec<String> {
        let mut result_set = match self.select_inner(
            "select tablename from pg_tables where schemaname = $1",
            Some(&["public"]),
        ) {
            Ok(result_set) => result_set,
            Err(error) => {
                warn!(%error, "listing tables failed");
                return Vec::new();
            }
        };

        let names: Vec<String> = result_set
            .rows()
            .filter_map(|row| {
                row.get("tablename")
                    .and_then(|value| value.as_str())
                    .map(str::to_string)
            })
            .collect();

        if let Some(error) = result_set.stream_error() {
            warn!(%error, "listing tables ended early");
        }

        names
    }
}

fn column_index(result: &dyn PgResultHandle, name: &str) -> Option<usize> {
    (0..result.column_count()).find(|&index| result.column_name(index) == Some(name))
}

fn catalog_oid(result: &dyn PgResultHandle, row: usize, column: Option<usize>) -> u32 {
    column
        .and_then(|column| result.value(row, column))
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(0)
}

impl<T: PgTransport> DatabaseAdapter for PostgresAdapter<T> {
    fn table_names(&mut self) -> Vec<String> {
        self.table_names_inner()
    }

    fn get_table<'a>(&'a mut self, _name: &str) -> Result<Box<dyn Table + 'a>> {
        Err(Error::Unimplemented)
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        self.execute_inner(sql)
    }

    fn select<'a>(&'a mut self, sql: &str) -> Result<Box<dyn ResultSet + 'a>> {
        Ok(Box::new(self.select_inner(sql, None)?))
    }

    fn select_with_params<'a>(
        &'a mut self,
        sql: &str,
        params: &[&str],
    ) -> Result<Box<dyn ResultSet + 'a>> {
        Ok(Box::new(self.select_inner(sql, Some(params))?))
    }
}
