// History collection: page backwards through the channel, render the
// messages to text + JSON exports, and either upload them or report where
// they were written.

use super::{markers, to_utc};
use crate::core::activity::ReactionSummary;
use crate::core::export::{
    history_json, history_text, sanitize_filename, HistoryRecord, UploadDecision,
};
use crate::discord::{Data, Error};
use crate::infra::export::WrittenFile;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use serenity::{CreateAttachment, CreateEmbed, CreateMessage, GetMessages};
use std::time::Duration;

pub struct HistoryOutcome {
    pub message_count: usize,
    pub uploaded: usize,
    pub local_paths: Vec<String>,
}

/// Reaction-triggered entry point: owns the busy-guard and the status
/// markers on the triggering message.
pub async fn run_from_reaction(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    let Some(_permit) = data.collection_guard.begin() else {
        message
            .reply(
                &ctx.http,
                "📋 A collection is already in progress. Please wait for it to finish.",
            )
            .await?;
        return Ok(());
    };

    markers::mark_processing(ctx, message, &data.config).await;
    match run(ctx, data, message.channel_id, message.guild_id).await {
        Ok(_) => {
            markers::mark_outcome(ctx, message, &data.config, true).await;
            Ok(())
        }
        Err(e) => {
            tracing::error!("history collection failed: {e}");
            let _ = message
                .reply(&ctx.http, format!("History collection failed: {e}"))
                .await;
            markers::mark_outcome(ctx, message, &data.config, false).await;
            Ok(())
        }
    }
}

/// The collection itself. Callers hold the busy-guard.
pub async fn run(
    ctx: &serenity::Context,
    data: &Data,
    channel_id: serenity::ChannelId,
    guild_id: Option<serenity::GuildId>,
) -> Result<HistoryOutcome, Error> {
    let channel_name = channel_id
        .name(&ctx)
        .await
        .unwrap_or_else(|_| format!("channel_{}", channel_id.get()));

    channel_id
        .say(
            &ctx.http,
            format!("📋 Collecting the history of **{channel_name}**... this can take a while."),
        )
        .await?;

    let limits = &data.config.limits;
    let mut collected: Vec<serenity::Message> = Vec::new();
    let mut before: Option<serenity::MessageId> = None;

    // The API hands out newest-first pages; walk backwards and flip at the
    // end so the export reads in arrival order.
    loop {
        let mut request = GetMessages::new().limit(limits.history_page_size);
        if let Some(cursor) = before {
            request = request.before(cursor);
        }
        let page = channel_id.messages(&ctx.http, request).await?;
        if page.is_empty() {
            break;
        }
        before = page.last().map(|m| m.id);
        let was_full_page = page.len() == limits.history_page_size as usize;
        collected.extend(page);

        if !was_full_page {
            break;
        }
        tracing::debug!("collected {} messages so far", collected.len());
        tokio::time::sleep(Duration::from_secs(limits.history_page_pause_secs)).await;
    }
    collected.reverse();

    let records: Vec<HistoryRecord> = collected
        .iter()
        .map(|m| HistoryRecord {
            message_id: m.id.get(),
            author_name: m.author.name.clone(),
            author_id: m.author.id.get(),
            content: m.content.clone(),
            timestamp: to_utc(m.timestamp),
            edited_at: m.edited_timestamp.map(to_utc),
            attachments: m.attachments.iter().map(|a| a.url.clone()).collect(),
            reactions: m
                .reactions
                .iter()
                .map(|r| ReactionSummary {
                    emoji: r.reaction_type.to_string(),
                    count: r.count,
                })
                .collect(),
        })
        .collect();

    if records.is_empty() {
        channel_id
            .say(&ctx.http, "No messages were found in this channel.")
            .await?;
        return Ok(HistoryOutcome {
            message_count: 0,
            uploaded: 0,
            local_paths: Vec::new(),
        });
    }

    let collected_at = Utc::now();
    let (guild_name, guild_id_num) = match guild_id {
        Some(gid) => (ctx.http.get_guild(gid).await?.name.clone(), gid.get()),
        None => ("direct".to_string(), 0),
    };

    let stamp = collected_at.format("%Y%m%d_%H%M%S");
    let base = sanitize_filename(&channel_name);
    let text_file = data.exports.write(
        &format!("{base}_history_{stamp}.txt"),
        history_text(&channel_name, collected_at, &records).as_bytes(),
    )?;
    let json_export = history_json(
        &guild_name,
        guild_id_num,
        &channel_name,
        channel_id.get(),
        collected_at,
        &records,
    );
    let json_file = data.exports.write(
        &format!("{base}_history_{stamp}.json"),
        serde_json::to_vec_pretty(&json_export)?.as_slice(),
    )?;

    let mut reply = CreateMessage::new();
    let mut uploaded = 0usize;
    let mut local_paths = Vec::new();
    for file in [&text_file, &json_file] {
        match UploadDecision::for_size(file.size_bytes, limits.upload_limit_bytes) {
            UploadDecision::Upload => {
                reply = reply.add_file(CreateAttachment::path(&file.path).await?);
                uploaded += 1;
            }
            UploadDecision::LocalPathOnly => {
                local_paths.push(file.path.display().to_string());
            }
        }
    }

    let embed = summary_embed(&channel_name, records.len(), &text_file, &json_file, &local_paths);
    channel_id
        .send_message(&ctx.http, reply.embed(embed))
        .await?;

    Ok(HistoryOutcome {
        message_count: records.len(),
        uploaded,
        local_paths,
    })
}

fn summary_embed(
    channel_name: &str,
    message_count: usize,
    text_file: &WrittenFile,
    json_file: &WrittenFile,
    local_paths: &[String],
) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title("📋 History collection complete")
        .description(format!("Collected the log of **{channel_name}**"))
        .color(serenity::Color::from_rgb(0, 255, 0))
        .field("Messages", format!("{message_count}"), true)
        .field(
            "Export size",
            format!(
                "{:.2} MB",
                (text_file.size_bytes + json_file.size_bytes) as f64 / (1024.0 * 1024.0)
            ),
            true,
        )
        .timestamp(serenity::Timestamp::now());

    if !local_paths.is_empty() {
        embed = embed.field(
            "⚠️ Too large to upload, saved locally",
            local_paths.join("\n"),
            false,
        );
    }

    embed
}
