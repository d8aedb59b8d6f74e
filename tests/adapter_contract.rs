//! Contract tests: both backends behind the same `DatabaseAdapter`
//! surface, driven through trait objects the way callers see them.

use sqlbridge::pg::{PostgresAdapter, ScriptedResult, ScriptedTransport};
use sqlbridge::sqlite::SqliteAdapter;
use sqlbridge::{DatabaseAdapter, Error, SqlValue};

/// Pull a single text column out of a query, the way `table_names` does.
fn project_column(adapter: &mut dyn DatabaseAdapter, sql: &str, column: &str) -> Vec<String> {
    let mut result_set = adapter.select(sql).expect("select");
    let values: Vec<String> = result_set
        .rows()
        .filter_map(|row| {
            row.get(column)
                .and_then(|value| value.as_str())
                .map(str::to_string)
        })
        .collect();
    assert!(result_set.stream_error().is_none());
    values
}

fn sqlite_with_rows() -> SqliteAdapter {
    let mut adapter = SqliteAdapter::open_in_memory().expect("open");
    adapter
        .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, label TEXT)")
        .expect("create");
    for label in ["one", "two", "three"] {
        adapter
            .execute(&format!("INSERT INTO t (label) VALUES ('{label}')"))
            .expect("insert");
    }
    adapter
}

#[test]
fn test_delete_reports_affected_rows_on_both_backends() {
    // SQLite, against real data.
    let mut sqlite = sqlite_with_rows();
    let sqlite: &mut dyn DatabaseAdapter = &mut sqlite;
    assert_eq!(sqlite.execute("DELETE FROM t").unwrap(), 3);
    assert_eq!(sqlite.execute("DELETE FROM t").unwrap(), 0);

    // PostgreSQL, against the scripted transport.
    let mut pg = PostgresAdapter::new(
        ScriptedTransport::materialized()
            .with_results(vec![ScriptedResult::command(3)])
            .with_results(vec![ScriptedResult::command(0)]),
    );
    let pg: &mut dyn DatabaseAdapter = &mut pg;
    assert_eq!(pg.execute("DELETE FROM t").unwrap(), 3);
    assert_eq!(pg.execute("DELETE FROM t").unwrap(), 0);
}

#[test]
fn test_select_one_is_a_single_int_row_materialized() {
    let transport = ScriptedTransport::materialized()
        .with_results(vec![ScriptedResult::tuples()
            .column("?column?", 23)
            .row(&[Some("1")])])
        .with_results(vec![ScriptedResult::tuples()
            .column("oid", 26)
            .column("typname", 19)
            .column("typelem", 26)
            .column("typarray", 26)
            .row(&[Some("23"), Some("int4"), Some("0"), Some("1007")])]);
    let mut adapter = PostgresAdapter::new(transport);
    let adapter: &mut dyn DatabaseAdapter = &mut adapter;

    let mut result_set = adapter.select("SELECT 1").unwrap();
    assert_eq!(result_set.row_count(), 1);
    assert_eq!(result_set.column_names().len(), 1);

    let rows: Vec<_> = result_set.rows().collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_index(0), Some(&SqlValue::Int4(1)));
}

#[test]
fn test_select_one_on_sqlite_is_a_cursor() {
    let mut adapter = SqliteAdapter::open_in_memory().unwrap();
    let adapter: &mut dyn DatabaseAdapter = &mut adapter;

    let mut result_set = adapter.select("SELECT 1 AS one").unwrap();
    // Cursor mode: the count is unknown until exhausted.
    assert_eq!(result_set.row_count(), 0);

    let rows: Vec<_> = result_set.rows().collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("one"), Some(&SqlValue::Int8(1)));
    assert!(result_set.stream_error().is_none());
}

#[test]
fn test_uniform_projection_across_backends() {
    let mut sqlite = sqlite_with_rows();
    let labels = project_column(&mut sqlite, "SELECT label FROM t ORDER BY id", "label");
    assert_eq!(labels, vec!["one", "two", "three"]);

    let mut pg = PostgresAdapter::new(ScriptedTransport::streaming().with_results(vec![
        ScriptedResult::single_tuple().column("label", 25).row(&[Some("one")]),
        ScriptedResult::single_tuple().column("label", 25).row(&[Some("two")]),
        ScriptedResult::single_tuple().column("label", 25).row(&[Some("three")]),
        ScriptedResult::tuples(),
    ]));
    let labels = project_column(&mut pg, "SELECT label FROM t ORDER BY id", "label");
    assert_eq!(labels, vec!["one", "two", "three"]);
}

#[test]
fn test_table_names_across_backends() {
    let mut sqlite = sqlite_with_rows();
    let sqlite: &mut dyn DatabaseAdapter = &mut sqlite;
    assert_eq!(sqlite.table_names(), vec!["t".to_string()]);

    let mut pg = PostgresAdapter::new(ScriptedTransport::streaming().with_results(vec![
        ScriptedResult::single_tuple().column("tablename", 19).row(&[Some("t")]),
        ScriptedResult::tuples(),
    ]));
    let pg: &mut dyn DatabaseAdapter = &mut pg;
    assert_eq!(pg.table_names(), vec!["t".to_string()]);
}

#[test]
fn test_get_table_capability_differs_consistently() {
    let mut sqlite = sqlite_with_rows();
    let sqlite: &mut dyn DatabaseAdapter = &mut sqlite;
    let mut table = sqlite.get_table("t").unwrap();
    assert_eq!(
        table.column_names(),
        vec!["id".to_string(), "label".to_string()]
    );
    assert!(matches!(
        table.get_column("ghost"),
        Err(Error::ColumnNotFound(_))
    ));

    let mut pg = PostgresAdapter::new(ScriptedTransport::materialized());
    let pg: &mut dyn DatabaseAdapter = &mut pg;
    assert!(matches!(pg.get_table("t"), Err(Error::Unimplemented)));
}

#[test]
fn test_streaming_error_slot_is_checkable_after_iteration() {
    let mut pg = PostgresAdapter::new(ScriptedTransport::streaming().with_results(vec![
        ScriptedResult::single_tuple().column("n", 23).row(&[Some("1")]),
        ScriptedResult::error("out of memory", false),
    ]));
    let pg: &mut dyn DatabaseAdapter = &mut pg;

    let mut result_set = pg.select("SELECT n FROM t").unwrap();
    let consumed = result_set.rows().count();
    assert_eq!(consumed, 1);
    match result_set.stream_error() {
        Some(Error::Query { message, fatal }) => {
            assert_eq!(message, "out of memory");
            assert!(!fatal);
        }
        other => panic!("expected a query error in the slot, got {other:?}"),
    }
}
