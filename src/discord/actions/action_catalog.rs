// Trigger -> action implementations. Each action owns its user-visible
// choreography: the ⏳/✅/❌ markers on the triggering message, progress
// messages, and the final reply.

pub mod chat;
pub mod collect_history;
pub mod collect_members;
pub mod greeting;
pub mod markers;
pub mod ocr;
pub mod stats;
pub mod transcribe;

use crate::discord::Error;
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;

/// Serenity's snowflake timestamps to chrono, for the log and export
/// models.
pub fn to_utc(ts: serenity::Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.unix_timestamp(), 0).unwrap_or_else(Utc::now)
}

/// Reply with `body` under a bold header, split into numbered chunks when it
/// exceeds the configured message length. `fenced` wraps each chunk in a
/// code block (transcriptions read better monospaced).
pub async fn reply_chunked(
    ctx: &serenity::Context,
    message: &serenity::Message,
    header: &str,
    body: &str,
    fenced: bool,
    max_len: usize,
) -> Result<(), Error> {
    let chars: Vec<char> = body.chars().collect();
    let chunks: Vec<String> = chars.chunks(max_len).map(|c| c.iter().collect()).collect();
    let total = chunks.len();

    for (index, chunk) in chunks.iter().enumerate() {
        let label = if total > 1 {
            format!("**{} ({}/{}):**", header, index + 1, total)
        } else {
            format!("**{}:**", header)
        };
        let text = if fenced {
            format!("{label}\n```\n{chunk}\n```")
        } else {
            format!("{label}\n{chunk}")
        };
        message.reply(&ctx.http, text).await?;
    }

    Ok(())
}
