//! Production [`PgTransport`] over the blocking `postgres` client.
//!
//! The client library exposes prepared statements with typed column
//! descriptions rather than the raw drain loop, so this transport buffers
//! each statement's results and replays them through the transport
//! contract: column type OIDs come from the statement description and
//! values are rendered to their canonical text wire form by OID.
//! Single-row mode is emulated by handing the buffered rows out one
//! `SingleTuple` handle per pull.

use std::collections::VecDeque;

use postgres::types::{FromSql, ToSql, Type};
use postgres::{Client, NoTls};
use tracing::warn;

use crate::error::{Error, Result};
use crate::pg::adapter::PostgresAdapter;
use crate::pg::protocol::{ExecStatus, PgResultHandle, PgTransport};

/// A fully fetched backend result, replayed through [`PgResultHandle`].
struct BufferedResult {
    status: ExecStatus,
    command_tuples: u64,
    columns: Vec<(String, u32)>,
    rows: Vec<Vec<Option<String>>>,
}

impl BufferedResult {
    fn empty_query() -> Self {
        Self {
            status: ExecStatus::EmptyQuery,
            command_tuples: 0,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn command(affected: u64) -> Self {
        Self {
            status: ExecStatus::CommandOk,
            command_tuples: affected,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn tuples(columns: Vec<(String, u32)>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self {
            status: ExecStatus::TuplesOk,
            command_tuples: rows.len() as u64,
            columns,
            rows,
        }
    }

    fn single_tuple(columns: Vec<(String, u32)>, row: Vec<Option<String>>) -> Self {
        Self {
            status: ExecStatus::SingleTuple,
            command_tuples: 0,
            columns,
            rows: vec![row],
        }
    }

    fn error() -> Self {
        Self {
            status: ExecStatus::FatalError,
            command_tuples: 0,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl PgResultHandle for BufferedResult {
    fn status(&self) -> ExecStatus {
        self.status
    }

    fn command_tuples(&self) -> u64 {
        self.command_tuples
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|(name, _)| name.as_str())
    }

    fn column_type_oid(&self, index: usize) -> u32 {
        self.columns.get(index).map(|(_, oid)| *oid).unwrap_or(0)
    }

    fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }
}

/// Statement transport over a blocking PostgreSQL connection.
pub struct PostgresTransport {
    client: Client,
    pending: VecDeque<BufferedResult>,
    last_error: String,
}

impl PostgresTransport {
    /// Connect using a libpq-style connection string
    /// (`host=localhost user=postgres dbname=...`).
    pub fn connect(params: &str) -> Result<Self> {
        let client =
            Client::connect(params, NoTls).map_err(|e| Error::Connection(e.to_string()))?;
        Ok(Self {
            client,
            pending: VecDeque::new(),
            last_error: String::new(),
        })
    }

    fn run(&mut self, sql: &str, params: &[&str]) -> VecDeque<BufferedResult> {
        if sql.trim().is_empty() {
            return VecDeque::from(vec![BufferedResult::empty_query()]);
        }

        match self.try_run(sql, params) {
            Ok(result) => VecDeque::from(vec![result]),
            Err(error) => {
                self.last_error = describe_error(&error);
                VecDeque::from(vec![BufferedResult::error()])
            }
        }
    }

    fn try_run(
        &mut self,
        sql: &str,
        params: &[&str],
    ) -> std::result::Result<BufferedResult, postgres::Error> {
        let statement = self.client.prepare(sql)?;
        let columns: Vec<(String, u32)> = statement
            .columns()
            .iter()
            .map(|column| (column.name().to_string(), column.type_().oid()))
            .collect();
        let bound: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|param| param as &(dyn ToSql + Sync))
            .collect();

        if columns.is_empty() {
            let affected = self.client.execute(&statement, &bound)?;
            Ok(BufferedResult::command(affected))
        } else {
            let rows = self.client.query(&statement, &bound)?;
            let rendered = rows.iter().map(render_row).collect();
            Ok(BufferedResult::tuples(columns, rendered))
        }
    }
}

impl PgTransport for PostgresTransport {
    fn send_query(&mut self, sql: &str) -> Result<()> {
        self.send_query_params(sql, &[])
    }

    fn send_query_params(&mut self, sql: &str, params: &[&str]) -> Result<()> {
        if self.client.is_closed() {
            return Err(Error::NotConnected);
        }
        self.pending = self.run(sql, params);
        Ok(())
    }

    fn set_single_row_mode(&mut self) -> bool {
        let splittable = matches!(
            self.pending.front(),
            Some(result) if result.status == ExecStatus::TuplesOk
        );

        if splittable {
            if let Some(front) = self.pending.pop_front() {
                let BufferedResult { columns, rows, .. } = front;
                let mut split = VecDeque::with_capacity(rows.len() + 1);
                for row in rows {
                    split.push_back(BufferedResult::single_tuple(columns.clone(), row));
                }
                split.push_back(BufferedResult::tuples(columns, Vec::new()));
                split.append(&mut self.pending);
                self.pending = split;
            }
        }

        true
    }

    fn next_result(&mut self) -> Option<Box<dyn PgResultHandle>> {
        self.pending
            .pop_front()
            .map(|result| Box::new(result) as Box<dyn PgResultHandle>)
    }

    fn error_message(&mut self) -> String {
        self.last_error.clone()
    }

    fn escape_literal(&mut self, raw: &str) -> Result<String> {
        if raw.contains('\0') {
            return Err(Error::StringEscaping(
                "string contains a NUL byte".to_string(),
            ));
        }
        Ok(raw.replace('\'', "''"))
    }
}

impl PostgresAdapter<PostgresTransport> {
    /// Connect to a PostgreSQL database.
    pub fn connect(params: &str) -> Result<Self> {
        Ok(PostgresAdapter::new(PostgresTransport::connect(params)?))
    }
}

fn describe_error(error: &postgres::Error) -> String {
    match error.as_db_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}

fn render_row(row: &postgres::Row) -> Vec<Option<String>> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(index, column)| render_value(row, index, column.type_()))
        .collect()
}

/// Render one binary column value to its text wire form by OID.
fn render_value(row: &postgres::Row, index: usize, type_: &Type) -> Option<String> {
    match type_.oid() {
        // bool
        16 => row
            .try_get::<_, Option<bool>>(index)
            .ok()
            .flatten()
            .map(|v| (if v { "t" } else { "f" }).to_string()),
        // int2
        21 => row
            .try_get::<_, Option<i16>>(index)
            .ok()
            .flatten()
            .map(|v| v.to_string()),
        // int4
        23 => row
            .try_get::<_, Option<i32>>(index)
            .ok()
            .flatten()
            .map(|v| v.to_string()),
        // int8
        20 => row
            .try_get::<_, Option<i64>>(index)
            .ok()
            .flatten()
            .map(|v| v.to_string()),
        // oid
        26 => row
            .try_get::<_, Option<u32>>(index)
            .ok()
            .flatten()
            .map(|v| v.to_string()),
        // text, name, bpchar, varchar
        25 | 19 | 1042 | 1043 => row.try_get::<_, Option<String>>(index).ok().flatten(),
        // bool[]
        1000 => render_array::<bool>(row, index, |v| (if v { "t" } else { "f" }).to_string()),
        // int2[]
        1005 => render_array::<i16>(row, index, |v| v.to_string()),
        // int4[]
        1007 => render_array::<i32>(row, index, |v| v.to_string()),
        // int8[]
        1016 => render_array::<i64>(row, index, |v| v.to_string()),
        // oid[]
        1028 => render_array::<u32>(row, index, |v| v.to_string()),
        // text[], name[], varchar[]
        1009 | 1003 | 1015 => render_array::<String>(row, index, |v| v),
        _ => match row.try_get::<_, Option<String>>(index) {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    oid = type_.oid(),
                    column = index,
                    "no text rendering for column type; value treated as null"
                );
                None
            }
        },
    }
}

fn render_array<T>(
    row: &postgres::Row,
    index: usize,
    render: impl Fn(T) -> String,
) -> Option<String>
where
    T: for<'a> FromSql<'a>,
{
    row.try_get::<_, Option<Vec<Option<T>>>>(index)
        .ok()
        .flatten()
        .map(|elements| {
            let rendered: Vec<String> = elements
                .into_iter()
                .map(|element| element.map(&render).unwrap_or_else(|| "NULL".to_string()))
                .collect();
            format!("{{{}}}", rendered.join(","))
        })
}
