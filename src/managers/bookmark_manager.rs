//! Bookmark Manager for Threatmark.
//!
//! Implements `BookmarkManagerTrait`: CRUD operations for bookmarks and
//! categories, backed by SQLite via `rusqlite`.
//!
//! URLs are validated and normalized before they reach storage. Duplicates are
//! caught by a case-insensitive pre-check, and the `UNIQUE` constraint on
//! `bookmarks.url` backs that check up for writes racing past it. Removing a
//! category leaves its bookmarks in place; the schema's `ON DELETE SET NULL`
//! clears their `category_id`.

use rusqlite::types::ValueRef;
use rusqlite::{ffi, params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::services::url_validator::{sanitize_url, validate_url};
use crate::types::bookmark::{Bookmark, BookmarkInput, Category};
use crate::types::errors::BookmarkError;

const BOOKMARK_COLUMNS: &str = "id, category_id, url, threat, reporter, date_added, status, tags, notes, created_at, updated_at";

/// Trait defining bookmark store operations.
pub trait BookmarkManagerTrait {
    fn create_bookmark(&mut self, input: &BookmarkInput) -> Result<Bookmark, BookmarkError>;
    fn update_bookmark(&mut self, id: i64, input: &BookmarkInput) -> Result<(), BookmarkError>;
    fn delete_bookmark(&mut self, id: i64) -> Result<(), BookmarkError>;
    fn get_bookmark(&self, id: i64) -> Result<Bookmark, BookmarkError>;
    fn list_bookmarks(&self) -> Result<Vec<Bookmark>, BookmarkError>;
    fn create_category(&mut self, name: &str) -> Result<Category, BookmarkError>;
    fn rename_category(&mut self, id: i64, name: &str) -> Result<(), BookmarkError>;
    fn delete_category(&mut self, id: i64) -> Result<(), BookmarkError>;
    fn get_category(&self, id: i64) -> Result<Category, BookmarkError>;
    fn list_categories(&self) -> Result<Vec<Category>, BookmarkError>;
    fn count_bookmarks_in_category(&self, id: i64) -> Result<i64, BookmarkError>;
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the current UNIX timestamp in milliseconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    /// Requires, validates and sanitizes a bookmark URL, then rejects it if
    /// another bookmark already holds it (ignoring case).
    fn prepare_url(&self, raw: Option<&str>, exclude_id: Option<i64>) -> Result<String, BookmarkError> {
        let raw = raw
            .filter(|url| !url.is_empty())
            .ok_or(BookmarkError::MissingUrl)?;

        validate_url(raw)?;
        let url = sanitize_url(raw);

        if let Some(existing) = self.find_duplicate(&url, exclude_id)? {
            debug!(%url, existing, "Rejected duplicate bookmark URL");
            return Err(BookmarkError::DuplicateUrl(url));
        }
        Ok(url)
    }

    fn find_duplicate(&self, url: &str, exclude_id: Option<i64>) -> Result<Option<i64>, BookmarkError> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM bookmarks WHERE url = ?1 COLLATE NOCASE AND (?2 IS NULL OR id != ?2) LIMIT 1",
                params![url, exclude_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Checks whether a category with the given ID exists.
    fn category_exists(&self, id: i64) -> Result<bool, BookmarkError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn ensure_category(&self, category_id: Option<i64>) -> Result<(), BookmarkError> {
        match category_id {
            Some(id) if !self.category_exists(id)? => Err(BookmarkError::CategoryNotFound(id)),
            _ => Ok(()),
        }
    }

    /// Reads a single `Bookmark` row into a struct.
    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            category_id: row.get(1)?,
            url: row.get(2)?,
            threat: row.get(3)?,
            reporter: row.get(4)?,
            date_added: row.get(5)?,
            status: row.get(6)?,
            tags: decode_tags(row.get_ref(7)?),
            notes: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    /// Saves a new bookmark and returns it as stored.
    fn create_bookmark(&mut self, input: &BookmarkInput) -> Result<Bookmark, BookmarkError> {
        let url = self.prepare_url(input.url.as_deref(), None)?;
        self.ensure_category(input.category_id)?;

        let now = Self::now();
        let tags = encode_tags(input.tags.as_deref())?;

        self.conn
            .execute(
                "INSERT INTO bookmarks (url, threat, reporter, date_added, status, tags, notes, category_id, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    url,
                    non_blank(&input.threat),
                    non_blank(&input.reporter),
                    non_blank(&input.date_added),
                    non_blank(&input.status),
                    tags,
                    non_blank(&input.notes),
                    input.category_id,
                    now,
                    now
                ],
            )
            .map_err(|e| classify_write_error(e, &url, input.category_id))?;

        let id = self.conn.last_insert_rowid();
        debug!(id, %url, "Created bookmark");
        self.get_bookmark(id)
    }

    /// Replaces every mutable field of a bookmark.
    ///
    /// Optional fields missing from `input` are cleared.
    fn update_bookmark(&mut self, id: i64, input: &BookmarkInput) -> Result<(), BookmarkError> {
        let url = self.prepare_url(input.url.as_deref(), Some(id))?;
        self.ensure_category(input.category_id)?;

        let now = Self::now();
        let tags = encode_tags(input.tags.as_deref())?;

        let affected = self
            .conn
            .execute(
                "UPDATE bookmarks SET url = ?1, threat = ?2, reporter = ?3, date_added = ?4, status = ?5, \
                 tags = ?6, notes = ?7, category_id = ?8, updated_at = ?9 WHERE id = ?10",
                params![
                    url,
                    non_blank(&input.threat),
                    non_blank(&input.reporter),
                    non_blank(&input.date_added),
                    non_blank(&input.status),
                    tags,
                    non_blank(&input.notes),
                    input.category_id,
                    now,
                    id
                ],
            )
            .map_err(|e| classify_write_error(e, &url, input.category_id))?;

        if affected == 0 {
            return Err(BookmarkError::NotFound(id));
        }
        debug!(id, %url, "Updated bookmark");
        Ok(())
    }

    /// Removes a bookmark by ID.
    fn delete_bookmark(&mut self, id: i64) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?;

        if affected == 0 {
            return Err(BookmarkError::NotFound(id));
        }
        debug!(id, "Deleted bookmark");
        Ok(())
    }

    fn get_bookmark(&self, id: i64) -> Result<Bookmark, BookmarkError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM bookmarks WHERE id = ?1", BOOKMARK_COLUMNS),
                params![id],
                Self::row_to_bookmark,
            )
            .optional()?
            .ok_or(BookmarkError::NotFound(id))
    }

    /// Lists all bookmarks, newest first.
    fn list_bookmarks(&self) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bookmarks ORDER BY created_at DESC, id DESC",
            BOOKMARK_COLUMNS
        ))?;

        let rows = stmt.query_map([], Self::row_to_bookmark)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Creates a category from a trimmed, non-empty name.
    fn create_category(&mut self, name: &str) -> Result<Category, BookmarkError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BookmarkError::EmptyName);
        }

        let now = Self::now();
        self.conn.execute(
            "INSERT INTO categories (name, created_at) VALUES (?1, ?2)",
            params![name, now],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(id, name, "Created category");
        Ok(Category {
            id,
            name: name.to_string(),
            created_at: now,
        })
    }

    fn rename_category(&mut self, id: i64, name: &str) -> Result<(), BookmarkError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BookmarkError::EmptyName);
        }

        let affected = self.conn.execute(
            "UPDATE categories SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;

        if affected == 0 {
            return Err(BookmarkError::NotFound(id));
        }
        Ok(())
    }

    /// Deletes a category. Its bookmarks become uncategorized.
    fn delete_category(&mut self, id: i64) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;

        if affected == 0 {
            return Err(BookmarkError::NotFound(id));
        }
        debug!(id, "Deleted category");
        Ok(())
    }

    fn get_category(&self, id: i64) -> Result<Category, BookmarkError> {
        self.conn
            .query_row(
                "SELECT id, name, created_at FROM categories WHERE id = ?1",
                params![id],
                Self::row_to_category,
            )
            .optional()?
            .ok_or(BookmarkError::NotFound(id))
    }

    /// Lists all categories, newest first.
    fn list_categories(&self) -> Result<Vec<Category>, BookmarkError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, created_at FROM categories ORDER BY created_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], Self::row_to_category)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn count_bookmarks_in_category(&self, id: i64) -> Result<i64, BookmarkError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM bookmarks WHERE category_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Empty strings are stored as NULL.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn encode_tags(tags: Option<&[String]>) -> Result<Option<String>, BookmarkError> {
    tags.map(serde_json::to_string)
        .transpose()
        .map_err(|e| BookmarkError::Storage(format!("Failed to encode tags: {}", e)))
}

/// NULL stays absent; anything that is not a JSON array of strings reads as no tags.
///
/// The column is read untyped so a BLOB or numeric value written outside the
/// manager degrades instead of failing the whole row.
fn decode_tags(raw: ValueRef<'_>) -> Option<Vec<String>> {
    let bytes = match raw {
        ValueRef::Null => return None,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => bytes,
        other => {
            warn!(column_type = ?other.data_type(), "Non-text stored tags, reading as empty");
            return Some(Vec::new());
        }
    };
    match serde_json::from_slice::<Vec<String>>(bytes) {
        Ok(tags) => Some(tags),
        Err(e) => {
            warn!(error = %e, "Malformed stored tags, reading as empty");
            Some(Vec::new())
        }
    }
}

/// Maps constraint violations raised by a bookmark write onto their domain errors.
fn classify_write_error(err: rusqlite::Error, url: &str, category_id: Option<i64>) -> BookmarkError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE => {
                warn!(%url, "Duplicate URL caught by storage constraint");
                return BookmarkError::DuplicateUrl(url.to_string());
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                return BookmarkError::CategoryNotFound(category_id.unwrap_or_default());
            }
            _ => {}
        }
    }
    BookmarkError::Storage(err.to_string())
}
