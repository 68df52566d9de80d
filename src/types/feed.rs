use serde::{Deserialize, Serialize};

/// Which URLhaus "recent" listing to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    RecentUrls,
    RecentPayloads,
}

impl FeedKind {
    /// Path segment under the upstream API root.
    pub fn path(&self) -> &'static str {
        match self {
            FeedKind::RecentUrls => "urls",
            FeedKind::RecentPayloads => "payloads",
        }
    }
}
