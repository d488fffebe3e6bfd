use crate::core::activity::ReactionSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One message as captured during a history collection.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecord {
    pub message_id: u64,
    pub author_name: String,
    pub author_id: u64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub attachments: Vec<String>,
    pub reactions: Vec<ReactionSummary>,
}

/// One guild member as captured during a member collection.
#[derive(Debug, Clone, Serialize)]
pub struct MemberRecord {
    pub username: String,
    pub display_name: String,
    pub user_id: u64,
    pub joined_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub is_bot: bool,
    pub roles: Vec<String>,
    pub top_role: Option<String>,
    pub boosting_since: Option<DateTime<Utc>>,
}
