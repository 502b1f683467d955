//! Short-form memos

use crate::time::Instant;

/// A file attached to a memo
#[derive(Debug, Clone)]
pub struct MemoResource {
    pub filename: String,
    pub external_link: Option<String>,
}

/// A memo with its creation instant
#[derive(Debug, Clone)]
pub struct Memo {
    pub content: String,
    /// Creation epoch (seconds); identifies and places the memo
    pub created_ts: i64,
    pub created: Instant,
    /// Upstream row status such as `NORMAL` or `ARCHIVED`
    pub row_status: Option<String>,
    pub resources: Vec<MemoResource>,
}
