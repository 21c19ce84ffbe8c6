use rusqlite::Connection;
use stockledger_core::db::migrations::latest_version;
use stockledger_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "stock_history");
}

#[test]
fn reopening_a_ledger_file_keeps_schema_and_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO stock_history (item_name, quantity, record_date)
             VALUES ('Widget', 3, '2024-01-01');",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let rows: i64 = second
        .query_row("SELECT COUNT(*) FROM stock_history;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn opening_ledger_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "ledger_schema_too_new");
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn storage_rejects_update_and_delete() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO stock_history (item_name, quantity, record_date)
         VALUES ('Widget', 3, '2024-01-01');",
        [],
    )
    .unwrap();

    let update_err = conn
        .execute("UPDATE stock_history SET quantity = 4;", [])
        .unwrap_err();
    assert!(update_err.to_string().contains("append-only"));

    let delete_err = conn.execute("DELETE FROM stock_history;", []).unwrap_err();
    assert!(delete_err.to_string().contains("append-only"));
    assert_eq!(DbError::from(delete_err).code(), "ledger_sqlite_error");

    let quantity: i64 = conn
        .query_row("SELECT quantity FROM stock_history;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(quantity, 3);
}

#[test]
fn storage_checks_reject_negative_quantity_and_malformed_dates() {
    let conn = open_db_in_memory().unwrap();

    assert!(conn
        .execute(
            "INSERT INTO stock_history (item_name, quantity, record_date)
             VALUES ('Widget', -1, '2024-01-01');",
            [],
        )
        .is_err());
    assert!(conn
        .execute(
            "INSERT INTO stock_history (item_name, quantity, record_date)
             VALUES ('Widget', 1, '01/01/2024');",
            [],
        )
        .is_err());
    assert!(conn
        .execute(
            "INSERT INTO stock_history (item_name, quantity, record_date)
             VALUES ('   ', 1, '2024-01-01');",
            [],
        )
        .is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

#[test]
fn held_write_lock_reports_ledger_busy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("busy.db");

    let holder = open_db(&path).unwrap();
    holder.execute_batch("BEGIN IMMEDIATE;").unwrap();

    let waiter = open_db(&path).unwrap();
    waiter.busy_timeout(std::time::Duration::ZERO).unwrap();
    let err = waiter.execute_batch("BEGIN IMMEDIATE;").unwrap_err();
    assert_eq!(DbError::from(err).code(), "ledger_busy");

    holder.execute_batch("COMMIT;").unwrap();
}
