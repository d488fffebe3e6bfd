// Image transcription: download the first image attachment, run it through
// the vision endpoint, reply with the extracted text.

use super::{markers, reply_chunked};
use crate::core::triggers::trigger_models::is_image_filename;
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

pub async fn run(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    let Some(attachment) = message
        .attachments
        .iter()
        .find(|a| is_image_filename(&a.filename))
    else {
        // Reaction on a message without an image; nothing to do.
        return Ok(());
    };

    markers::mark_processing(ctx, message, &data.config).await;

    let outcome: Result<(), Error> = async {
        let image = attachment.download().await?;
        let text = data.openai.extract_image_text(&image).await?;

        if text.trim().is_empty() {
            message
                .reply(&ctx.http, "No text could be found in the image.")
                .await?;
        } else {
            reply_chunked(
                ctx,
                message,
                "📝 Image transcription",
                text.trim(),
                true,
                data.config.limits.max_message_length,
            )
            .await?;
        }
        Ok(())
    }
    .await;

    match outcome {
        Ok(()) => {
            markers::mark_outcome(ctx, message, &data.config, true).await;
            Ok(())
        }
        Err(e) => {
            tracing::error!("image transcription failed: {e}");
            let _ = message
                .reply(&ctx.http, format!("Image transcription failed: {e}"))
                .await;
            markers::mark_outcome(ctx, message, &data.config, false).await;
            Ok(())
        }
    }
}
