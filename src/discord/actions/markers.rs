// Status-marker reactions the bot leaves on the message it is working on:
// ⏳ while busy, then ✅ or ❌.

use crate::core::config::BotConfig;
use poise::serenity_prelude as serenity;
use serenity::ReactionType;

fn unicode(symbol: &str) -> ReactionType {
    ReactionType::Unicode(symbol.to_string())
}

/// Add the processing marker. Marker failures are logged and ignored; they
/// must never abort the action itself.
pub async fn mark_processing(
    ctx: &serenity::Context,
    message: &serenity::Message,
    config: &BotConfig,
) {
    if let Err(e) = message.react(&ctx.http, unicode(&config.emojis.processing)).await {
        tracing::warn!("failed to add processing marker: {e}");
    }
}

/// Swap the processing marker for the outcome marker.
pub async fn mark_outcome(
    ctx: &serenity::Context,
    message: &serenity::Message,
    config: &BotConfig,
    success: bool,
) {
    if let Err(e) = message
        .delete_reaction(&ctx.http, None, unicode(&config.emojis.processing))
        .await
    {
        tracing::debug!("failed to remove processing marker: {e}");
    }

    let outcome = if success {
        &config.emojis.success
    } else {
        &config.emojis.error
    };
    if let Err(e) = message.react(&ctx.http, unicode(outcome)).await {
        tracing::warn!("failed to add outcome marker: {e}");
    }
}

/// Invite a human to trigger a capability by pre-adding its emoji.
pub async fn invite_reaction(
    ctx: &serenity::Context,
    message: &serenity::Message,
    symbol: &str,
) {
    if let Err(e) = message.react(&ctx.http, unicode(symbol)).await {
        tracing::warn!("failed to add invite reaction {symbol}: {e}");
    }
}
