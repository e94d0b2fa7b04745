use rusqlite::Connection;
use userdir_core::db::migrations::latest_version;
use userdir_core::db::{open_db, open_db_in_memory, DbError};
use userdir_core::{KvStore, SqliteKvStore, StorageError};

#[test]
fn open_db_in_memory_creates_kv_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_entries");
}

#[test]
fn reopening_database_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("userdir.sqlite3");

    let first = SqliteKvStore::open(&path).unwrap();
    first.set("users", "[]").unwrap();
    first.set("users", "[{}]").unwrap();
    drop(first);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);

    let second = SqliteKvStore::from_connection(conn);
    assert_eq!(second.get("users").unwrap().as_deref(), Some("[{}]"));
    assert_eq!(second.get("other").unwrap(), None);
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 42;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match &err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(*found, 42);
            assert_eq!(*supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        err.to_string(),
        format!(
            "kv_entries schema version 42 is newer than this build supports ({})",
            latest_version()
        )
    );

    let err = SqliteKvStore::open(&path).err().unwrap();
    assert!(matches!(
        err,
        StorageError::Db(DbError::SchemaTooNew { .. })
    ));
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
