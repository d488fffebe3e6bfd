// Room statistics: read the metadata sidecar, reply with a summary, and
// attach the raw log and sidecar files when they exist.

use super::markers;
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;
use serenity::{CreateAttachment, CreateEmbed, CreateMessage};

pub async fn run_from_reaction(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    markers::mark_processing(ctx, message, &data.config).await;

    match run(ctx, data, message.channel_id).await {
        Ok(()) => {
            markers::mark_outcome(ctx, message, &data.config, true).await;
            Ok(())
        }
        Err(e) => {
            tracing::error!("room stats failed: {e}");
            let _ = message
                .reply(&ctx.http, format!("Fetching room statistics failed: {e}"))
                .await;
            markers::mark_outcome(ctx, message, &data.config, false).await;
            Ok(())
        }
    }
}

pub async fn run(
    ctx: &serenity::Context,
    data: &Data,
    channel_id: serenity::ChannelId,
) -> Result<(), Error> {
    let room_id = channel_id.get();
    let Some(meta) = data.activity.stats(room_id).await? else {
        channel_id
            .say(&ctx.http, "No activity has been logged for this room yet.")
            .await?;
        return Ok(());
    };

    let embed = CreateEmbed::default()
        .title("📊 Room statistics")
        .color(serenity::Color::from_rgb(0, 255, 0))
        .field("Messages", format!("{}", meta.message_count), true)
        .field("Unique users", format!("{}", meta.unique_users.len()), true)
        .field(
            "Logging since",
            meta.log_start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            false,
        )
        .field(
            "Last updated",
            meta.last_updated.format("%Y-%m-%d %H:%M:%S").to_string(),
            false,
        );

    let mut reply = CreateMessage::new().embed(embed);

    // Attach the raw files so the numbers can be checked.
    let store = data.activity.store();
    for path in [store.log_path(room_id), store.metadata_path(room_id)] {
        if path.exists() {
            reply = reply.add_file(CreateAttachment::path(&path).await?);
        }
    }

    channel_id.send_message(&ctx.http, reply).await?;
    Ok(())
}
