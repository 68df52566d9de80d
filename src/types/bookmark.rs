use serde::{Deserialize, Serialize};

/// A saved threat-feed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub category_id: Option<i64>,
    pub url: String,
    pub threat: Option<String>,
    pub reporter: Option<String>,
    pub date_added: Option<String>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A user-defined grouping for bookmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
}

/// The mutable field set of a bookmark, as supplied by a caller.
///
/// Used for both creation and full-replace updates: a `None` field is stored
/// as NULL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookmarkInput {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub threat: Option<String>,
    #[serde(default)]
    pub reporter: Option<String>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl BookmarkInput {
    /// Input carrying only a URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }
}
