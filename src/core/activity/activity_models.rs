use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one reaction pile on a message at log time. This is display
/// data, not a tracked count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionSummary {
    pub emoji: String,
    pub count: u64,
}

/// One accepted message, rendered into the log exactly once.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub author_id: u64,
    /// Display name at log time. Advisory only; the id is the stable key.
    pub author_name: String,
    pub content: String,
    pub attachment_urls: Vec<String>,
    pub reactions: Vec<ReactionSummary>,
    pub message_id: u64,
}

impl LogEntry {
    /// The human-readable block appended to the log file. One line for the
    /// message itself, indented continuation lines for extras.
    pub fn render(&self) -> String {
        let mut block = format!(
            "[{}] {} ({}): {}\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.author_name,
            self.author_id,
            self.content
        );
        if !self.attachment_urls.is_empty() {
            block.push_str(&format!(
                "    attachments: {}\n",
                self.attachment_urls.join(", ")
            ));
        }
        if !self.reactions.is_empty() {
            let rendered: Vec<String> = self
                .reactions
                .iter()
                .map(|r| format!("{}({})", r.emoji, r.count))
                .collect();
            block.push_str(&format!("    reactions: {}\n", rendered.join(", ")));
        }
        block
    }
}

/// The JSON sidecar tracking aggregates per room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMetadata {
    pub room_id: u64,
    /// Set once when the log is first created, never touched again.
    pub log_start_time: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub message_count: u64,
    /// Author ids in first-seen order, no duplicates.
    pub unique_users: Vec<u64>,
}

impl LogMetadata {
    pub fn new(room_id: u64, now: DateTime<Utc>) -> Self {
        Self {
            room_id,
            log_start_time: now,
            last_updated: now,
            message_count: 0,
            unique_users: Vec::new(),
        }
    }

    /// Fold one accepted entry into the aggregates.
    pub fn absorb(&mut self, entry: &LogEntry) {
        self.message_count += 1;
        if !self.unique_users.contains(&entry.author_id) {
            self.unique_users.push(entry.author_id);
        }
        self.last_updated = entry.timestamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(author_id: u64, content: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            author_id,
            author_name: format!("user{author_id}"),
            content: content.to_string(),
            attachment_urls: Vec::new(),
            reactions: Vec::new(),
            message_id: 1,
        }
    }

    #[test]
    fn absorb_counts_and_dedupes_authors() {
        let mut meta = LogMetadata::new(1, Utc::now());
        meta.absorb(&entry(10, "a"));
        meta.absorb(&entry(20, "b"));
        meta.absorb(&entry(10, "c"));

        assert_eq!(meta.message_count, 3);
        assert_eq!(meta.unique_users, vec![10, 20]);
    }

    #[test]
    fn render_includes_attachments_and_reactions() {
        let mut e = entry(1, "look at this");
        e.attachment_urls = vec!["https://cdn.example/cat.png".to_string()];
        e.reactions = vec![ReactionSummary {
            emoji: "👍".to_string(),
            count: 3,
        }];

        let block = e.render();
        assert!(block.contains("look at this"));
        assert!(block.contains("attachments: https://cdn.example/cat.png"));
        assert!(block.contains("👍(3)"));
    }
}
