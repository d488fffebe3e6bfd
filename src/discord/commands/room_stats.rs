// Slash-command access to the activity log aggregates.

use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Show activity statistics for the logged room
#[poise::command(slash_command)]
pub async fn roomstats(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    if !data.config.features.room_stats {
        ctx.say("❌ Room statistics are disabled.").await?;
        return Ok(());
    }

    let room_id = data.config.target_channel_id;
    let Some(meta) = data.activity.stats(room_id).await? else {
        ctx.say("No activity has been logged yet.").await?;
        return Ok(());
    };

    let embed = serenity::CreateEmbed::default()
        .title("📊 Room statistics")
        .color(0x00ff00)
        .field("Messages", format!("{}", meta.message_count), true)
        .field("Unique users", format!("{}", meta.unique_users.len()), true)
        .field(
            "Last updated",
            meta.last_updated.format("%Y-%m-%d %H:%M:%S").to_string(),
            false,
        );

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
