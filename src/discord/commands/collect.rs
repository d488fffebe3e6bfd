// Slash-command entry points for the two collection actions. Same flows as
// the emoji triggers, same busy-guard.

use crate::discord::actions::collect_history as history_action;
use crate::discord::actions::collect_members as members_action;
use crate::discord::{Context, Error};

/// Export this channel's message history
#[poise::command(slash_command, guild_only)]
pub async fn collect_history(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    if !data.config.features.chat_collect {
        ctx.say("❌ History collection is disabled.").await?;
        return Ok(());
    }
    if ctx.channel_id().get() != data.config.target_channel_id {
        ctx.say("❌ This command only works in the designated channel.")
            .await?;
        return Ok(());
    }

    let Some(_permit) = data.collection_guard.begin() else {
        ctx.say("📋 A collection is already in progress. Please wait.")
            .await?;
        return Ok(());
    };

    ctx.defer().await?;
    let outcome =
        history_action::run(ctx.serenity_context(), data, ctx.channel_id(), ctx.guild_id())
            .await?;
    let mut summary = format!(
        "✅ History collection finished: {} messages, {} file(s) uploaded.",
        outcome.message_count, outcome.uploaded
    );
    if !outcome.local_paths.is_empty() {
        summary.push_str(&format!("\nSaved locally: {}", outcome.local_paths.join(", ")));
    }
    ctx.say(summary).await?;

    Ok(())
}

/// Export the guild member list
#[poise::command(slash_command, guild_only)]
pub async fn collect_members(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    if !data.config.features.member_collect {
        ctx.say("❌ Member collection is disabled.").await?;
        return Ok(());
    }
    if ctx.channel_id().get() != data.config.target_channel_id {
        ctx.say("❌ This command only works in the designated channel.")
            .await?;
        return Ok(());
    }
    let guild_id = ctx.guild_id().ok_or("Must be in a guild")?;

    let Some(_permit) = data.collection_guard.begin() else {
        ctx.say("👁️ A collection is already in progress. Please wait.")
            .await?;
        return Ok(());
    };

    ctx.defer().await?;
    let outcome =
        members_action::run(ctx.serenity_context(), data, ctx.channel_id(), guild_id).await?;
    let mut summary = format!(
        "✅ Member collection finished: {} members, {} file(s) uploaded.",
        outcome.member_count, outcome.uploaded
    );
    if !outcome.local_paths.is_empty() {
        summary.push_str(&format!("\nSaved locally: {}", outcome.local_paths.join(", ")));
    }
    ctx.say(summary).await?;

    Ok(())
}
