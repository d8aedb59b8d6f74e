use crate::error::Error;
use crate::pg::adapter::PostgresAdapter;
use crate::pg::protocol::{ExecStatus, PgResultHandle, PgTransport};
use crate::traits::ResultSet;
use crate::types::ResultRow;

/// A PostgreSQL result set in one of two shapes.
///
/// Materialized: wraps one fully fetched result handle; row count and
/// column names are known up front and rows decode lazily by index, with
/// on-demand catalog lookups for unknown column types.
///
/// Streaming (single-row mode): no handle is held up front; every pull of
/// the next row takes one result from the transport. Type resolution runs
/// cache-only in this mode since the transport cannot interleave a
/// catalog query while a result stream is in progress.
///
/// Borrows the adapter mutably for its whole lifetime, so the connection
/// cannot be given a new statement while this set is alive.
pub struct PgResultSet<'a, T: PgTransport> {
    adapter: &'a mut PostgresAdapter<T>,
    result: Option<Box<dyn PgResultHandle>>,
    single_row: bool,
    finished: bool,
    error: Option<Error>,
}

impl<'a, T: PgTransport> PgResultSet<'a, T> {
    pub(crate) fn materialized(
        adapter: &'a mut PostgresAdapter<T>,
        result: Box<dyn PgResultHandle>,
    ) -> Self {
        Self {
            adapter,
            result: Some(result),
            single_row: false,
            finished: false,
            error: None,
        }
    }

    pub(crate) fn streaming(adapter: &'a mut PostgresAdapter<T>) -> Self {
        Self {
            adapter,
            result: None,
            single_row: true,
            finished: false,
            error: None,
        }
    }

    fn drain_remaining(&mut self) {
        while self.adapter.transport.next_result().is_some() {}
    }
}

impl<T: PgTransport> ResultSet for PgResultSet<'_, T> {
    fn row_count(&self) -> usize {
        match &self.result {
            Some(result) => result.row_count(),
            None => 0,
        }
    }

    fn column_names(&self) -> Vec<String> {
        match &self.result {
            Some(result) => (0..result.column_count())
                .map(|index| result.column_name(index).unwrap_or("").to_string())
                .collect(),
            None => Vec::new(),
        }
    }

    fn rows(&mut self) -> Box<dyn Iterator<Item = ResultRow> + '_> {
        Box::new(PgRows {
            result_set: self,
            row_index: 0,
        })
    }

    fn stream_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }
}

impl<T: PgTransport> Drop for PgResultSet<'_, T> {
    fn drop(&mut self) {
        // An abandoned cursor leaves pending results on the connection;
        // consume them so the connection is reusable and every handle is
        // released exactly once.
        if self.single_row && !self.finished {
            self.drain_remaining();
        }
    }
}

struct PgRows<'s, 'a, T: PgTransport> {
    result_set: &'s mut PgResultSet<'a, T>,
    row_index: usize,
}

impl<T: PgTransport> Iterator for PgRows<'_, '_, T> {
    type Item = ResultRow;

    fn next(&mut self) -> Option<ResultRow> {
        if self.result_set.single_row {
            self.next_streamed()
        } else {
            self.next_materialized()
        }
    }
}

impl<T: PgTransport> PgRows<'_, '_, T> {
    fn next_materialized(&mut self) -> Option<ResultRow> {
        let PgResultSet {
            adapter, result, ..
        } = &mut *self.result_set;
        let result = result.as_deref()?;

        if self.row_index >= result.row_count() {
            return None;
        }

        let row = adapter.build_row(result, self.row_index, true);
        self.row_index += 1;
        Some(row)
    }

    fn next_streamed(&mut self) -> Option<ResultRow> {
        let result_set = &mut *self.result_set;
        if result_set.finished {
            return None;
        }

        let result = match result_set.adapter.transport.next_result() {
            Some(result) => result,
            None => {
                result_set.finished = true;
                return None;
            }
        };

        match result_set.adapter.classify(result) {
            Ok(result) => {
                if result.status() == ExecStatus::SingleTuple {
                    // The handle is released as soon as the row is built.
                    Some(result_set.adapter.build_row(result.as_ref(), 0, false))
                } else {
                    // Query complete. The protocol requires consuming the
                    // trailing results before the connection is reusable.
                    drop(result);
                    result_set.finished = true;
                    result_set.drain_remaining();
                    None
                }
            }
            Err(error) => {
                result_set.error = Some(error);
                result_set.finished = true;
                None
            }
        }
    }
}
