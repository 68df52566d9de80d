//! RPC method handler for the Threatmark JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches calls to the bookmark store and the rate-limited
//! feed client held by [`App`], and turns every failure into an [`RpcError`]
//! carrying an HTTP-style status.

use std::time::Instant;

use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::app::App;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::services::rate_limiter::client_identifier;
use crate::types::bookmark::BookmarkInput;
use crate::types::errors::{BookmarkError, FeedError};
use crate::types::feed::FeedKind;

/// A failed RPC call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcError {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    pub retry_after_secs: Option<u64>,
}

impl RpcError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            code: "bad_request",
            message: message.into(),
            retry_after_secs: None,
        }
    }

    /// Wire form placed under `"error"` in the response.
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "status": self.status,
            "code": self.code,
            "message": self.message,
        });
        if let Some(secs) = self.retry_after_secs {
            body["retry_after_secs"] = json!(secs);
        }
        body
    }
}

impl From<BookmarkError> for RpcError {
    fn from(err: BookmarkError) -> Self {
        if let BookmarkError::Storage(detail) = &err {
            error!(%detail, "Bookmark storage failure");
        }
        Self {
            status: err.status_code(),
            code: err.code(),
            message: err.public_message(),
            retry_after_secs: None,
        }
    }
}

impl From<FeedError> for RpcError {
    fn from(err: FeedError) -> Self {
        Self {
            status: err.status_code(),
            code: err.code(),
            message: err.to_string(),
            retry_after_secs: None,
        }
    }
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, RpcError> {
    match method {
        "feed.urls" => handle_feed(app, FeedKind::RecentUrls, params).await,
        "feed.payloads" => handle_feed(app, FeedKind::RecentPayloads, params).await,
        _ => handle_store_method(app, method, params),
    }
}

/// Store and housekeeping methods. These run synchronously on the caller's task.
fn handle_store_method(app: &App, method: &str, params: &Value) -> Result<Value, RpcError> {
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // Bookmarks
        "bookmark.list" => {
            let db = app.db();
            let mgr = BookmarkManager::new(db.connection());
            let bookmarks = mgr.list_bookmarks()?;
            Ok(json!({ "bookmarks": bookmarks }))
        }
        "bookmark.get" => {
            let id = param_id(params)?;
            let db = app.db();
            let mgr = BookmarkManager::new(db.connection());
            let bookmark = mgr.get_bookmark(id)?;
            Ok(json!(bookmark))
        }
        "bookmark.create" => {
            let input = bookmark_input(params)?;
            let db = app.db();
            let mut mgr = BookmarkManager::new(db.connection());
            let bookmark = mgr.create_bookmark(&input)?;
            info!(id = bookmark.id, url = %bookmark.url, "Bookmark saved");
            Ok(json!({ "message": "Bookmark saved", "id": bookmark.id, "bookmark": bookmark }))
        }
        "bookmark.update" => {
            let id = param_id(params)?;
            let input = bookmark_input(params)?;
            let db = app.db();
            let mut mgr = BookmarkManager::new(db.connection());
            mgr.update_bookmark(id, &input)?;
            Ok(json!({ "message": "Bookmark updated" }))
        }
        "bookmark.delete" => {
            let id = param_id(params)?;
            let db = app.db();
            let mut mgr = BookmarkManager::new(db.connection());
            mgr.delete_bookmark(id)?;
            Ok(json!({ "message": "Bookmark deleted" }))
        }

        // Categories
        "category.list" => {
            let db = app.db();
            let mgr = BookmarkManager::new(db.connection());
            let categories = mgr.list_categories()?;
            Ok(json!({ "categories": categories }))
        }
        "category.create" => {
            let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
            let db = app.db();
            let mut mgr = BookmarkManager::new(db.connection());
            let category = mgr.create_category(name)?;
            Ok(json!({ "message": "Category created", "id": category.id, "category": category }))
        }
        "category.rename" => {
            let id = param_id(params)?;
            let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
            let db = app.db();
            let mut mgr = BookmarkManager::new(db.connection());
            mgr.rename_category(id, name)?;
            Ok(json!({ "message": "Category updated" }))
        }
        "category.delete" => {
            let id = param_id(params)?;
            let db = app.db();
            let mut mgr = BookmarkManager::new(db.connection());
            let uncategorized = mgr.count_bookmarks_in_category(id)?;
            mgr.delete_category(id)?;
            Ok(json!({ "message": "Category deleted", "uncategorized": uncategorized }))
        }

        _ => Err(RpcError {
            status: 404,
            code: "unknown_method",
            message: format!("unknown method: {}", method),
            retry_after_secs: None,
        }),
    }
}

/// Rate-limited read of an upstream feed listing.
async fn handle_feed(app: &App, kind: FeedKind, params: &Value) -> Result<Value, RpcError> {
    let client = client_identifier(
        header_value(params, "x-forwarded-for"),
        header_value(params, "x-real-ip"),
    );

    let limiter = app.limiter_for(kind);
    let now = Instant::now();
    let decision = limiter.check_at(&client, now);

    if !decision.allowed {
        let wait = decision.retry_after_secs(now);
        debug!(%client, ?kind, wait, "Feed request rate limited");
        return Err(RpcError {
            status: 429,
            code: "rate_limited",
            message: format!("Rate limit exceeded. Try again in {} seconds.", wait),
            retry_after_secs: Some(wait),
        });
    }

    let limit = app.feed_client.clamp_limit(parse_limit(params.get("limit")));
    let data = app.feed_client.fetch(kind, limit).await?;

    Ok(json!({
        "data": data,
        "rate_limit": {
            "limit": limiter.max_requests(),
            "remaining": decision.remaining,
            "reset_in_ms": decision.retry_after(now).as_millis() as u64,
        }
    }))
}

fn param_id(params: &Value) -> Result<i64, RpcError> {
    match params.get("id") {
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| RpcError::bad_request("invalid id")),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| RpcError::bad_request("invalid id")),
        _ => Err(RpcError::bad_request("missing id")),
    }
}

fn bookmark_input(params: &Value) -> Result<BookmarkInput, RpcError> {
    let fields = params.get("fields").unwrap_or(params);
    serde_json::from_value(fields.clone())
        .map_err(|e| RpcError::bad_request(format!("invalid bookmark fields: {}", e)))
}

/// Case-insensitive lookup in the optional `headers` object of the params.
fn header_value<'a>(params: &'a Value, name: &str) -> Option<&'a str> {
    params
        .get("headers")?
        .as_object()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.as_str())
}

/// Accepts a number or numeric string. Anything else means "use the default".
fn parse_limit(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
