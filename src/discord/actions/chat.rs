// Conversational reply through the chat-completion endpoint, with the
// service-side rolling history for this channel.

use super::reply_chunked;
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

pub async fn run(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    let _ = message.channel_id.broadcast_typing(&ctx.http).await;

    match data
        .openai
        .chat_reply(
            message.channel_id.get(),
            &message.author.name,
            &message.content,
        )
        .await
    {
        Ok(answer) => {
            reply_chunked(
                ctx,
                message,
                "🤖 Assistant",
                &answer,
                false,
                data.config.limits.max_message_length,
            )
            .await?;
        }
        Err(e) => {
            tracing::error!("chat reply failed: {e}");
            message
                .reply(&ctx.http, format!("The assistant ran into a problem: {e}"))
                .await?;
        }
    }

    Ok(())
}
