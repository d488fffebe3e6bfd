// Audio transcription: download the first audio attachment and run it
// through the speech-to-text endpoint.

use super::{markers, reply_chunked};
use crate::core::openai::TranscriptionRequest;
use crate::core::triggers::trigger_models::is_audio_filename;
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

const LANGUAGE_HINT: &str = "ja";
const PROMPT_HINT: &str =
    "The following is spoken Japanese. Transcribe it accurately with proper punctuation.";

pub async fn run(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    let Some(attachment) = message
        .attachments
        .iter()
        .find(|a| is_audio_filename(&a.filename))
    else {
        return Ok(());
    };

    markers::mark_processing(ctx, message, &data.config).await;

    let outcome: Result<(), Error> = async {
        let audio = attachment.download().await?;
        let request = TranscriptionRequest {
            audio,
            filename: attachment.filename.clone(),
            language: Some(LANGUAGE_HINT.to_string()),
            prompt: Some(PROMPT_HINT.to_string()),
        };
        let transcript = data.openai.transcribe(&request).await?;

        if transcript.is_empty() {
            message
                .reply(&ctx.http, "No speech could be recognized in the audio.")
                .await?;
        } else {
            reply_chunked(
                ctx,
                message,
                "🎤 Audio transcription",
                &transcript,
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
            tracing::error!("audio transcription failed: {e}");
            let _ = message
                .reply(&ctx.http, format!("Audio transcription failed: {e}"))
                .await;
            markers::mark_outcome(ctx, message, &data.config, false).await;
            Ok(())
        }
    }
}
