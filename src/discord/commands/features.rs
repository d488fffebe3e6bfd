// Introspection commands: which features are on, and which emoji does
// what.

use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Show which bot features are enabled
#[poise::command(slash_command)]
pub async fn features(ctx: Context<'_>) -> Result<(), Error> {
    let mut embed = serenity::CreateEmbed::default()
        .title("🤖 Bot features")
        .color(0x00ff00);

    for (name, enabled) in ctx.data().config.features.entries() {
        let status = if enabled { "✅ enabled" } else { "❌ disabled" };
        embed = embed.field(name, status, true);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show the reaction emoji table
#[poise::command(slash_command)]
pub async fn reactions(ctx: Context<'_>) -> Result<(), Error> {
    let config = &ctx.data().config;
    let descriptions = config.emoji_descriptions();

    let mut embed = serenity::CreateEmbed::default()
        .title("🎯 Reaction table")
        .color(0x0099ff);

    for (capability, emoji) in config.emojis.entries() {
        let description = descriptions.get(capability).copied().unwrap_or(capability);
        embed = embed.field(format!("{emoji} {capability}"), description, true);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
