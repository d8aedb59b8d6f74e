//! A scripted statement transport for testing.
//!
//! Plays the role the real connection plays: each sent statement consumes
//! the next scripted drain sequence, and every handed-out result handle
//! reports its release into a shared [`ReleaseLog`] so tests can assert
//! the exactly-once release discipline.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::pg::protocol::{ExecStatus, PgResultHandle, PgTransport};

/// A recorded statement for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub sql: String,
    pub params: Vec<String>,
}

/// Counts result handles handed out and released.
#[derive(Debug, Default)]
pub struct ReleaseLog {
    created: Cell<usize>,
    released: Cell<usize>,
}

impl ReleaseLog {
    pub fn created(&self) -> usize {
        self.created.get()
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }

    /// Handles currently alive. 0 means every created handle was
    /// released, and a handle cannot be released twice by construction.
    pub fn outstanding(&self) -> usize {
        self.created.get() - self.released.get()
    }
}

/// One scripted backend result.
#[derive(Debug, Clone)]
pub struct ScriptedResult {
    status: ExecStatus,
    command_tuples: u64,
    columns: Vec<(String, u32)>,
    rows: Vec<Vec<Option<String>>>,
    error_message: Option<String>,
}

impl ScriptedResult {
    fn with_status(status: ExecStatus) -> Self {
        Self {
            status,
            command_tuples: 0,
            columns: Vec::new(),
            rows: Vec::new(),
            error_message: None,
        }
    }

    /// A command-complete result with an affected-row count.
    pub fn command(affected: u64) -> Self {
        let mut result = Self::with_status(ExecStatus::CommandOk);
        result.command_tuples = affected;
        result
    }

    /// A tuples result; add columns and rows with the builder methods.
    pub fn tuples() -> Self {
        Self::with_status(ExecStatus::TuplesOk)
    }

    /// A single-row-mode result carrying one row.
    pub fn single_tuple() -> Self {
        Self::with_status(ExecStatus::SingleTuple)
    }

    pub fn empty_query() -> Self {
        Self::with_status(ExecStatus::EmptyQuery)
    }

    pub fn bad_response() -> Self {
        Self::with_status(ExecStatus::BadResponse)
    }

    pub fn unknown_status(code: i32) -> Self {
        Self::with_status(ExecStatus::Unknown(code))
    }

    pub fn error(message: &str, fatal: bool) -> Self {
        let status = if fatal {
            ExecStatus::FatalError
        } else {
            ExecStatus::NonfatalError
        };
        let mut result = Self::with_status(status);
        result.error_message = Some(message.to_string());
        result
    }

    pub fn column(mut self, name: &str, type_oid: u32) -> Self {
        self.columns.push((name.to_string(), type_oid));
        self
    }

    pub fn row(mut self, values: &[Option<&str>]) -> Self {
        self.rows
            .push(values.iter().map(|v| v.map(str::to_string)).collect());
        self
    }
}

struct ScriptedHandle {
    result: ScriptedResult,
    log: Rc<ReleaseLog>,
}

impl Drop for ScriptedHandle {
    fn drop(&mut self) {
        self.log.released.set(self.log.released.get() + 1);
    }
}

impl PgResultHandle for ScriptedHandle {
    fn status(&self) -> ExecStatus {
        self.result.status
    }

    fn command_tuples(&self) -> u64 {
        self.result.command_tuples
    }

    fn row_count(&self) -> usize {
        self.result.rows.len()
    }

    fn column_count(&self) -> usize {
        self.result.columns.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.result
            .columns
            .get(index)
            .map(|(name, _)| name.as_str())
    }

    fn column_type_oid(&self, index: usize) -> u32 {
        self.result
            .columns
            .get(index)
            .map(|(_, oid)| *oid)
            .unwrap_or(0)
    }

    fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.result.rows.get(row)?.get(column)?.as_deref()
    }
}

/// Scripted implementation of [`PgTransport`].
///
/// Statements consume scripted drain sequences in FIFO order; a statement
/// with no remaining script drains to nothing (the adapter surfaces that
/// as [`Error::NoResults`]).
pub struct ScriptedTransport {
    scripts: VecDeque<Vec<ScriptedResult>>,
    in_flight: VecDeque<ScriptedResult>,
    single_row_supported: bool,
    send_failure: Option<String>,
    last_error: String,
    recorded: Vec<RecordedQuery>,
    releases: Rc<ReleaseLog>,
}

impl ScriptedTransport {
    fn new(single_row_supported: bool) -> Self {
        Self {
            scripts: VecDeque::new(),
            in_flight: VecDeque::new(),
            single_row_supported,
            send_failure: None,
            last_error: String::new(),
            recorded: Vec::new(),
            releases: Rc::new(ReleaseLog::default()),
        }
    }

    /// A transport without single-row support: selects fall back to
    /// materialized result sets.
    pub fn materialized() -> Self {
        Self::new(false)
    }

    /// A transport with single-row support: selects stream.
    pub fn streaming() -> Self {
        Self::new(true)
    }

    /// Queue the drain sequence for the next statement.
    pub fn with_results(mut self, results: Vec<ScriptedResult>) -> Self {
        self.scripts.push_back(results);
        self
    }

    /// Make every subsequent send fail outright.
    pub fn with_send_failure(mut self, message: &str) -> Self {
        self.send_failure = Some(message.to_string());
        self
    }

    /// Shared handle-release ledger; clone before handing the transport
    /// to an adapter.
    pub fn releases(&self) -> Rc<ReleaseLog> {
        Rc::clone(&self.releases)
    }

    pub fn recorded_queries(&self) -> &[RecordedQuery] {
        &self.recorded
    }

    /// How many recorded statements contain `needle`.
    pub fn queries_containing(&self, needle: &str) -> usize {
        self.recorded
            .iter()
            .filter(|query| query.sql.contains(needle))
            .count()
    }

    fn record(&mut self, sql: &str, params: &[&str]) {
        self.recorded.push(RecordedQuery {
            sql: sql.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        });
    }
}

impl PgTransport for ScriptedTransport {
    fn send_query(&mut self, sql: &str) -> Result<()> {
        self.send_query_params(sql, &[])
    }

    fn send_query_params(&mut self, sql: &str, params: &[&str]) -> Result<()> {
        self.record(sql, params);
        if let Some(message) = &self.send_failure {
            return Err(Error::Send(message.clone()));
        }
        self.in_flight = self
            .scripts
            .pop_front()
            .map(VecDeque::from)
            .unwrap_or_default();
        Ok(())
    }

    fn set_single_row_mode(&mut self) -> bool {
        self.single_row_supported
    }

    fn next_result(&mut self) -> Option<Box<dyn PgResultHandle>> {
        let result = self.in_flight.pop_front()?;
        if let Some(message) = &result.error_message {
            self.last_error = message.clone();
        }
        self.releases.created.set(self.releases.created.get() + 1);
        Some(Box::new(ScriptedHandle {
            result,
            log: Rc::clone(&self.releases),
        }))
    }

    fn error_message(&mut self) -> String {
        self.last_error.clone()
    }

    fn escape_literal(&mut self, raw: &str) -> Result<String> {
        Ok(raw.replace('\'', "''"))
    }
}
