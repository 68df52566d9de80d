//! Versioned schema for the bookmark store.
//!
//! Applied versions are recorded in `schema_version`. Each pending step runs
//! in its own transaction together with its version row, so an interrupted
//! upgrade resumes from the last completed step.

use rusqlite::{params, Connection};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

struct Migration {
    version: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: categories and bookmarks",
        sql: "
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS bookmarks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category_id INTEGER,
                url TEXT NOT NULL UNIQUE,
                threat TEXT,
                reporter TEXT,
                date_added TEXT,
                status TEXT,
                tags TEXT,
                notes TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_url ON bookmarks(url);
            CREATE INDEX IF NOT EXISTS idx_created_at ON bookmarks(created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_category_id ON bookmarks(category_id);
        ",
    },
    Migration {
        version: 2,
        description: "Case-insensitive URL index, category listing index",
        sql: "
            CREATE INDEX IF NOT EXISTS idx_url_nocase ON bookmarks(url COLLATE NOCASE);
            CREATE INDEX IF NOT EXISTS idx_categories_created_at ON categories(created_at DESC);
        ",
    },
];

/// Highest version defined in this build.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Highest applied version, or 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT IFNULL(MAX(version), 0) FROM schema_version", [], |row| {
        row.get(0)
    })
    .unwrap_or(0)
}

/// Sets connection pragmas and applies every pending migration.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    // Pragmas are per-connection and must be set on every open.
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             description TEXT NOT NULL,
             applied_at INTEGER NOT NULL
         );",
    )?;

    let start = get_schema_version(conn);
    for migration in MIGRATIONS.iter().filter(|m| m.version > start) {
        apply(conn, migration)?;
    }

    let end = get_schema_version(conn);
    if end > start {
        info!(from = start, to = end, "Applied schema migrations");
    }
    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<(), rusqlite::Error> {
    let applied_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO schema_version (version, description, applied_at) VALUES (?1, ?2, ?3)",
        params![migration.version, migration.description, applied_at],
    )?;
    tx.commit()
}
