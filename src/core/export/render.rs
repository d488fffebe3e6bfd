// Renderers for the collection exports: history to text/JSON, members to
// text/CSV. Pure string/value producers; the export writer in infra/ puts
// them on disk.

use super::export_models::{HistoryRecord, MemberRecord};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;

const DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether a finished export fits under the platform's upload ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDecision {
    /// At or under the ceiling: attach the file to the reply.
    Upload,
    /// Over the ceiling: reply with the local path instead.
    LocalPathOnly,
}

impl UploadDecision {
    pub fn for_size(size_bytes: u64, ceiling_bytes: u64) -> Self {
        if size_bytes <= ceiling_bytes {
            UploadDecision::Upload
        } else {
            UploadDecision::LocalPathOnly
        }
    }
}

/// Strip path separators and whitespace out of a user-controlled name so it
/// is safe as a filename component.
pub fn sanitize_filename(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// The human-readable history export: a header, then one block per message
/// in arrival order.
pub fn history_text(
    channel_name: &str,
    collected_at: DateTime<Utc>,
    records: &[HistoryRecord],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {channel_name} channel log ===\n"));
    out.push_str(&format!(
        "collected at: {}\n",
        collected_at.format(DATE_FMT)
    ));
    out.push_str(&format!("total messages: {}\n", records.len()));
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    for record in records {
        out.push_str(&format!(
            "[{}] {}\n",
            record.timestamp.format(DATE_FMT),
            record.author_name
        ));
        if !record.content.is_empty() {
            out.push_str(&format!("content: {}\n", record.content));
        }
        if !record.attachments.is_empty() {
            out.push_str(&format!("attachments: {}\n", record.attachments.join(", ")));
        }
        if !record.reactions.is_empty() {
            let rendered: Vec<String> = record
                .reactions
                .iter()
                .map(|r| format!("{}({})", r.emoji, r.count))
                .collect();
            out.push_str(&format!("reactions: {}\n", rendered.join(", ")));
        }
        out.push_str(&format!("message id: {}\n", record.message_id));
        out.push_str(&"-".repeat(30));
        out.push_str("\n\n");
    }

    out
}

/// The structured history export, mirroring the text file.
pub fn history_json(
    guild_name: &str,
    guild_id: u64,
    channel_name: &str,
    channel_id: u64,
    collected_at: DateTime<Utc>,
    records: &[HistoryRecord],
) -> serde_json::Value {
    json!({
        "guild_name": guild_name,
        "guild_id": guild_id,
        "channel_name": channel_name,
        "channel_id": channel_id,
        "collected_at": collected_at.to_rfc3339(),
        "message_count": records.len(),
        "messages": records,
    })
}

/// The member list as numbered text blocks plus trailing aggregate stats.
pub fn member_text(
    guild_name: &str,
    collected_at: DateTime<Utc>,
    members: &[MemberRecord],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {guild_name} member list ===\n"));
    out.push_str(&format!(
        "collected at: {}\n",
        collected_at.format(DATE_FMT)
    ));
    out.push_str(&format!("total members: {}\n", members.len()));
    out.push_str(&"=".repeat(60));
    out.push_str("\n\n");

    for (index, member) in members.iter().enumerate() {
        out.push_str(&format!("[{:04}] {}\n", index + 1, member.username));
        out.push_str(&format!("  display name: {}\n", member.display_name));
        out.push_str(&format!("  user id: {}\n", member.user_id));
        out.push_str(&format!(
            "  account created: {}\n",
            member.created_at.format(DATE_FMT)
        ));
        out.push_str(&format!(
            "  joined server: {}\n",
            member
                .joined_at
                .map(|t| t.format(DATE_FMT).to_string())
                .unwrap_or_else(|| "unknown".to_string())
        ));
        out.push_str(&format!("  bot: {}\n", if member.is_bot { "yes" } else { "no" }));
        if let Some(top_role) = &member.top_role {
            out.push_str(&format!("  top role: {top_role}\n"));
        }
        if !member.roles.is_empty() {
            out.push_str(&format!("  roles: {}\n", member.roles.join(", ")));
        }
        out.push_str(&format!(
            "  boosting: {}\n",
            member
                .boosting_since
                .map(|t| format!("since {}", t.format(DATE_FMT)))
                .unwrap_or_else(|| "no".to_string())
        ));
        out.push_str(&"-".repeat(40));
        out.push_str("\n\n");
    }

    let bots = members.iter().filter(|m| m.is_bot).count();
    let boosters = members.iter().filter(|m| m.boosting_since.is_some()).count();
    out.push_str("=== statistics ===\n");
    out.push_str(&format!("total: {}\n", members.len()));
    out.push_str(&format!("humans: {}\n", members.len() - bots));
    out.push_str(&format!("bots: {bots}\n"));
    out.push_str(&format!("boosters: {boosters}\n"));

    let mut role_counts: HashMap<&str, usize> = HashMap::new();
    for member in members {
        for role in &member.roles {
            *role_counts.entry(role.as_str()).or_insert(0) += 1;
        }
    }
    if !role_counts.is_empty() {
        out.push_str("\n=== role statistics ===\n");
        let mut sorted: Vec<(&str, usize)> = role_counts.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        for (role, count) in sorted {
            out.push_str(&format!("{role}: {count}\n"));
        }
    }

    out
}

/// The member list as CSV. Quoting is hand-rolled RFC-4180: fields with
/// commas, quotes or newlines get quoted, inner quotes doubled.
pub fn member_csv(members: &[MemberRecord]) -> String {
    let mut out = String::new();
    out.push_str("no,username,display_name,user_id,created_at,joined_at,bot,top_role,role_count,roles,boosting_since\n");

    for (index, member) in members.iter().enumerate() {
        let fields = [
            (index + 1).to_string(),
            member.username.clone(),
            member.display_name.clone(),
            member.user_id.to_string(),
            member.created_at.format(DATE_FMT).to_string(),
            member
                .joined_at
                .map(|t| t.format(DATE_FMT).to_string())
                .unwrap_or_default(),
            member.is_bot.to_string(),
            member.top_role.clone().unwrap_or_default(),
            member.roles.len().to_string(),
            member.roles.join(", "),
            member
                .boosting_since
                .map(|t| t.format(DATE_FMT).to_string())
                .unwrap_or_default(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::activity::ReactionSummary;

    fn member(username: &str, roles: &[&str], is_bot: bool) -> MemberRecord {
        MemberRecord {
            username: username.to_string(),
            display_name: username.to_uppercase(),
            user_id: 1,
            joined_at: None,
            created_at: Utc::now(),
            is_bot,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            top_role: roles.first().map(|r| r.to_string()),
            boosting_since: None,
        }
    }

    #[test]
    fn upload_decision_boundary() {
        let ceiling = 8 * 1024 * 1024;
        assert_eq!(
            UploadDecision::for_size(ceiling, ceiling),
            UploadDecision::Upload
        );
        assert_eq!(
            UploadDecision::for_size(ceiling + 1, ceiling),
            UploadDecision::LocalPathOnly
        );
    }

    #[test]
    fn sanitize_strips_separators_and_spaces() {
        assert_eq!(
            sanitize_filename("my guild/general: chat"),
            "my_guild_general__chat"
        );
    }

    #[test]
    fn csv_quotes_commas_and_doubles_quotes() {
        let mut troublesome = member("a,b", &["role \"x\"", "other"], false);
        troublesome.display_name = "line\nbreak".to_string();
        let csv = member_csv(&[troublesome]);

        let data_line = csv.lines().nth(1).unwrap_or_default();
        assert!(data_line.contains("\"a,b\""));
        assert!(csv.contains("\"role \"\"x\"\", other\""));
        assert!(csv.contains("\"line\nbreak\""));
    }

    #[test]
    fn member_text_counts_bots_and_roles() {
        let members = vec![
            member("alice", &["admin", "dev"], false),
            member("bob", &["dev"], false),
            member("beep", &[], true),
        ];
        let text = member_text("guild", Utc::now(), &members);

        assert!(text.contains("total: 3"));
        assert!(text.contains("humans: 2"));
        assert!(text.contains("bots: 1"));
        assert!(text.contains("dev: 2"));
        assert!(text.contains("admin: 1"));
    }

    #[test]
    fn history_text_renders_blocks_in_order() {
        let now = Utc::now();
        let records = vec![
            HistoryRecord {
                message_id: 11,
                author_name: "alice".to_string(),
                author_id: 1,
                content: "first".to_string(),
                timestamp: now,
                edited_at: None,
                attachments: vec!["https://cdn.example/a.png".to_string()],
                reactions: vec![ReactionSummary {
                    emoji: "👍".to_string(),
                    count: 2,
                }],
            },
            HistoryRecord {
                message_id: 12,
                author_name: "bob".to_string(),
                author_id: 2,
                content: "second".to_string(),
                timestamp: now,
                edited_at: None,
                attachments: Vec::new(),
                reactions: Vec::new(),
            },
        ];

        let text = history_text("general", now, &records);
        assert!(text.contains("total messages: 2"));
        let first = text.find("first").unwrap();
        let second = text.find("second").unwrap();
        assert!(first < second);
        assert!(text.contains("👍(2)"));

        let value = history_json("guild", 1, "general", 2, now, &records);
        assert_eq!(value["message_count"], 2);
        assert_eq!(value["messages"][0]["message_id"], 11);
    }
}
