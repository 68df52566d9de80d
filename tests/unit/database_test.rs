//! Unit tests for the bookmark database: schema layout, pragmas and reopen behaviour.

use threatmark::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use threatmark::database::Database;

fn schema_object_exists(db: &Database, kind: &str, name: &str) -> bool {
    db.connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = ?1 AND name = ?2",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap_or(false)
}

#[test]
fn test_fresh_database_has_store_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    for table in ["categories", "bookmarks", "schema_version"] {
        assert!(schema_object_exists(&db, "table", table), "missing table {}", table);
    }
}

#[test]
fn test_fresh_database_has_lookup_indexes() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    for index in [
        "idx_url",
        "idx_created_at",
        "idx_category_id",
        "idx_url_nocase",
        "idx_categories_created_at",
    ] {
        assert!(schema_object_exists(&db, "index", index), "missing index {}", index);
    }
}

#[test]
fn test_bookmark_columns_match_layout() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let mut stmt = db
        .connection()
        .prepare("SELECT name FROM pragma_table_info('bookmarks') ORDER BY cid")
        .unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .map(|c| c.unwrap())
        .collect();
    assert_eq!(
        columns,
        vec![
            "id", "category_id", "url", "threat", "reporter", "date_added", "status", "tags",
            "notes", "created_at", "updated_at"
        ]
    );
}

#[test]
fn test_foreign_keys_enabled() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let enabled: i64 = db
        .connection()
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn test_url_unique_constraint_is_case_sensitive() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();
    conn.execute(
        "INSERT INTO bookmarks (url, created_at, updated_at) VALUES ('http://example.com/A', 1, 1)",
        [],
    )
    .unwrap();
    // Different case passes the constraint; the store's pre-check is what rejects it.
    conn.execute(
        "INSERT INTO bookmarks (url, created_at, updated_at) VALUES ('http://example.com/a', 1, 1)",
        [],
    )
    .unwrap();
    assert!(conn
        .execute(
            "INSERT INTO bookmarks (url, created_at, updated_at) VALUES ('http://example.com/a', 1, 1)",
            [],
        )
        .is_err());
}

#[test]
fn test_rerunning_migrations_changes_nothing() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    run_all(db.connection()).expect("second run should be a no-op");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);

    let recorded: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(recorded, i64::from(CURRENT_SCHEMA_VERSION));
}

#[test]
fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let db_path = dir.path().join("threatmark.db");

    {
        let db = Database::open(&db_path).expect("open failed");
        db.connection()
            .execute(
                "INSERT INTO categories (name, created_at) VALUES ('phishing', 1)",
                [],
            )
            .unwrap();
    }

    assert!(db_path.exists(), "Database file should be created on disk");

    // Reopen: data survives and migrations are not re-applied destructively.
    let db = Database::open(&db_path).expect("reopen failed");
    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}
