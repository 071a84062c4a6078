use prefstore_core::db::migrations::{current_version, latest_version};
use prefstore_core::db::{open_db, open_db_in_memory, DbError};
use prefstore_core::{OwnerRef, PreferenceRecord, PreferenceRepository, SqlitePreferenceRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "preferences");
    assert_index_exists(&conn, "idx_preferences_name_value");
}

#[test]
fn in_memory_stores_are_isolated() {
    let first = open_db_in_memory().unwrap();
    let second = open_db_in_memory().unwrap();

    SqlitePreferenceRepository::new(&first)
        .create_preference(&PreferenceRecord::new(
            OwnerRef::new("User", "1"),
            "language",
            "en_US",
        ))
        .unwrap();

    assert_eq!(
        SqlitePreferenceRepository::new(&second)
            .count_preferences()
            .unwrap(),
        0
    );
}

#[test]
fn opening_same_database_twice_is_idempotent_and_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefstore.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(current_version(&conn_first).unwrap(), latest_version());
    SqlitePreferenceRepository::new(&conn_first)
        .create_preference(&PreferenceRecord::new(
            OwnerRef::new("User", "1"),
            "timezone",
            "UTC",
        ))
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(current_version(&conn_second).unwrap(), latest_version());
    assert_eq!(
        SqlitePreferenceRepository::new(&conn_second)
            .count_preferences()
            .unwrap(),
        1
    );
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(err.to_string().contains("refusing to open"));
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
fn preferences_table_enforces_name_length_and_uniqueness() {
    let conn = open_db_in_memory().unwrap();

    let empty_name = conn.execute(
        "INSERT INTO preferences (preferrer_type, preferrer_id, name) VALUES ('User', '1', '');",
        [],
    );
    assert!(empty_name.is_err());

    conn.execute(
        "INSERT INTO preferences (preferrer_type, preferrer_id, name) VALUES ('User', '1', 'a');",
        [],
    )
    .unwrap();
    let duplicate = conn.execute(
        "INSERT INTO preferences (preferrer_type, preferrer_id, name) VALUES ('User', '1', 'a');",
        [],
    );
    assert!(duplicate.is_err());

    conn.execute(
        "INSERT INTO preferences (preferrer_type, preferrer_id, name) VALUES ('Group', '1', 'a');",
        [],
    )
    .unwrap();
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
