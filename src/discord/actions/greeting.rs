// Canned greeting for plain in-scope messages that matched nothing else.
// Only runs when the basic_greeting feature is on.

use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

pub async fn run(
    ctx: &serenity::Context,
    _data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    // The original varied its greeting by deployment; one friendly line is
    // enough here.
    message
        .channel_id
        .say(&ctx.http, "Hello there! 👋")
        .await?;
    Ok(())
}
