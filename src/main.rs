// This is the entry point of the Discord activity bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (files, OpenAI API)
// - `discord/` = Discord-specific adapters (commands, events, actions)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Route gateway events through the filter to the actions

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::activity::{ActivityLogger, LogEntry, ReactionSummary};
use crate::core::config::BotConfig;
use crate::core::export::CollectionGuard;
use crate::core::openai::OpenAiService;
use crate::core::triggers::{EventFilter, MessageEvent, ReactionEvent, Trigger};
use crate::discord::actions::{
    self, chat, collect_history, collect_members, greeting, markers, ocr, stats, transcribe,
};
use crate::discord::{Data, Error};
use crate::infra::activity::FileActivityStore;
use crate::infra::export::ExportWriter;
use crate::infra::openai::OpenAiClient;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a friendly, knowledgeable Discord assistant. Keep replies concise and helpful.";

/// Event handler for non-command Discord events: the message and reaction
/// paths the whole bot revolves around.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            handle_message(ctx, data, new_message).await
        }
        serenity::FullEvent::ReactionAdd { add_reaction } => {
            handle_reaction(ctx, data, add_reaction).await
        }
        _ => Ok(()),
    }
}

async fn handle_message(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    let bot_id = ctx.cache.current_user().id.get();

    let event = MessageEvent {
        channel_id: message.channel_id.get(),
        author_id: message.author.id.get(),
        author_is_bot: message.author.bot,
        content: message.content.clone(),
        attachment_names: message
            .attachments
            .iter()
            .map(|a| a.filename.clone())
            .collect(),
    };

    let triggers = data.filter.filter_message(&event, bot_id);

    if data.config.features.debug_logging && event.channel_id == data.config.target_channel_id {
        tracing::debug!(
            author = %message.author.name,
            ?triggers,
            "message in watched channel"
        );
    }

    // Activity logging is independent of trigger dispatch: plain chatter is
    // recorded even when it fires no action.
    if data.filter.should_log(&event, bot_id) {
        let entry = LogEntry {
            timestamp: actions::to_utc(message.timestamp),
            author_id: message.author.id.get(),
            author_name: message.author.name.clone(),
            content: message.content.clone(),
            attachment_urls: message.attachments.iter().map(|a| a.url.clone()).collect(),
            reactions: message
                .reactions
                .iter()
                .map(|r| ReactionSummary {
                    emoji: r.reaction_type.to_string(),
                    count: r.count,
                })
                .collect(),
            message_id: message.id.get(),
        };

        if let Err(e) = data.activity.record(event.channel_id, &entry).await {
            // Logged and carried on: a failed append must not take the
            // handler down with it.
            tracing::error!("failed to record activity: {e}");
        }
    }

    for trigger in triggers {
        match trigger {
            // Attachment and keyword matches get the capability emoji
            // pre-added; the heavy action runs when a human clicks it.
            Trigger::ImageOcr => {
                markers::invite_reaction(ctx, message, &data.config.emojis.image_ocr.canonical)
                    .await;
            }
            Trigger::VoiceTranscribe => {
                markers::invite_reaction(
                    ctx,
                    message,
                    &data.config.emojis.voice_transcribe.canonical,
                )
                .await;
            }
            Trigger::ChatCollect => {
                markers::invite_reaction(ctx, message, &data.config.emojis.chat_collect.canonical)
                    .await;
            }
            Trigger::MemberCollect => {
                markers::invite_reaction(
                    ctx,
                    message,
                    &data.config.emojis.member_collect.canonical,
                )
                .await;
            }
            Trigger::RoomStats => {
                markers::invite_reaction(ctx, message, &data.config.emojis.room_stats.canonical)
                    .await;
            }
            Trigger::ChatReply => {
                if let Err(e) = chat::run(ctx, data, message).await {
                    tracing::error!("chat reply action failed: {e}");
                }
            }
            Trigger::BasicReply => {
                if let Err(e) = greeting::run(ctx, data, message).await {
                    tracing::error!("greeting action failed: {e}");
                }
            }
        }
    }

    Ok(())
}

async fn handle_reaction(
    ctx: &serenity::Context,
    data: &Data,
    reaction: &serenity::Reaction,
) -> Result<(), Error> {
    let bot_id = ctx.cache.current_user().id.get();

    let event = ReactionEvent {
        channel_id: reaction.channel_id.get(),
        user_id: reaction.user_id.map(|u| u.get()).unwrap_or_default(),
        user_is_bot: reaction
            .member
            .as_ref()
            .map(|m| m.user.bot)
            .unwrap_or(false),
        emoji: reaction.emoji.to_string(),
    };

    let Some(trigger) = data.filter.filter_reaction(&event, bot_id) else {
        return Ok(());
    };

    // Fetch the message over HTTP so reactions on uncached messages work too.
    let message = reaction.message(&ctx.http).await?;

    let outcome = match trigger {
        Trigger::ImageOcr => ocr::run(ctx, data, &message).await,
        Trigger::VoiceTranscribe => transcribe::run(ctx, data, &message).await,
        Trigger::ChatCollect => collect_history::run_from_reaction(ctx, data, &message).await,
        Trigger::MemberCollect => collect_members::run_from_reaction(ctx, data, &message).await,
        Trigger::RoomStats => stats::run_from_reaction(ctx, data, &message).await,
        // Reactions never map to the conversational triggers.
        Trigger::ChatReply | Trigger::BasicReply => Ok(()),
    };

    if let Err(e) = outcome {
        tracing::error!(?trigger, "reaction action failed: {e}");
        let _ = message
            .reply(&ctx.http, "Something went wrong while handling that reaction.")
            .await;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Both secrets are hard requirements; fail loudly before connecting.
    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );
    let openai_api_key = std::env::var("OPENAI_API_KEY")
        .expect("Missing OPENAI_API_KEY environment variable! The AI features need it.");

    let config = Arc::new(
        BotConfig::from_env().expect("Invalid bot configuration, check your environment"),
    );

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let filter = Arc::new(EventFilter::new(Arc::clone(&config)));

    let activity_store = FileActivityStore::new(&config.log_dir);
    let activity = Arc::new(ActivityLogger::new(activity_store));

    let system_prompt =
        std::env::var("OPENAI_SYSTEM_PROMPT").unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string());
    let openai_client = OpenAiClient::new(openai_api_key);
    let openai = Arc::new(OpenAiService::new(
        openai_client,
        config.models.clone(),
        &config.limits,
        system_prompt,
    ));

    let exports = Arc::new(ExportWriter::new(&config.export_dir));

    let data = Data {
        config: Arc::clone(&config),
        filter,
        activity,
        openai,
        exports,
        collection_guard: Arc::new(CollectionGuard::new()),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================
    // Configure the poise framework with our commands and settings.

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            // Register all our commands here
            commands: vec![
                discord::commands::features::features(),
                discord::commands::features::reactions(),
                discord::commands::room_stats::roomstats(),
                discord::commands::collect::collect_history(),
                discord::commands::collect::collect_members(),
            ],
            // Event handler for messages and reactions
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                println!("🤖 Bot is starting up...");

                // Register slash commands globally (can take up to an hour to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                println!("✅ Commands registered!");
                println!("==================================================");
                println!("Logged in as {} ({})", ready.user.name, ready.user.id);
                println!("Guilds: {}", ready.guilds.len());
                println!("Watched channel: {}", data.config.target_channel_id);
                println!("Features:");
                for (name, enabled) in data.config.features.entries() {
                    println!("  {} {}", if enabled { "✅" } else { "❌" }, name);
                }
                println!("Reactions:");
                for (capability, emoji) in data.config.emojis.entries() {
                    println!("  {emoji} {capability}");
                }
                println!("==================================================");
                println!("🚀 Bot is ready!");

                Ok(data)
            })
        })
        .build();

    // Create the client and start the bot
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}
