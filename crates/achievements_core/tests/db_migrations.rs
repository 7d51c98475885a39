use achievements_core::db::migrations::latest_version;
use achievements_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "students");
    assert_table_exists(&conn, "events");
    assert_table_exists(&conn, "participations");
    assert_index_exists(&conn, "idx_events_start_date");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("achievements.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "participations");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
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
fn schema_rejects_zero_hours_and_unknown_levels() {
    let conn = open_db_in_memory().unwrap();

    let bad_level = conn.execute(
        "INSERT INTO events (uuid, name, level, start_date, end_date)
         VALUES ('e1', 'x', 'galactic', '2024-01-01', '2024-01-01');",
        [],
    );
    assert!(bad_level.is_err());

    conn.execute(
        "INSERT INTO events (uuid, name, level, start_date, end_date)
         VALUES ('e1', 'x', 'faculty', '2024-01-01', '2024-01-01');",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO students (uuid, full_name) VALUES ('s1', 'Иванов Иван');",
        [],
    )
    .unwrap();
    let zero_hours = conn.execute(
        "INSERT INTO participations (uuid, student_uuid, event_uuid, hours)
         VALUES ('p1', 's1', 'e1', 0);",
        [],
    );
    assert!(zero_hours.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
