//! SQLite storage for bookmarks and categories.
//!
//! ```no_run
//! use threatmark::database::Database;
//!
//! let db = Database::open("threatmark.db").expect("failed to open database");
//! let bookmarks: i64 = db
//!     .connection()
//!     .query_row("SELECT COUNT(*) FROM bookmarks", [], |row| row.get(0))
//!     .expect("count failed");
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
