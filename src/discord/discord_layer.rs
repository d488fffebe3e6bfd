// Discord layer - commands, actions and shared handler state.

#[path = "actions/action_catalog.rs"]
pub mod actions;
#[path = "commands/command_catalog.rs"]
pub mod commands;

use crate::core::activity::ActivityLogger;
use crate::core::config::BotConfig;
use crate::core::export::CollectionGuard;
use crate::core::openai::OpenAiService;
use crate::core::triggers::EventFilter;
use crate::infra::activity::FileActivityStore;
use crate::infra::export::ExportWriter;
use crate::infra::openai::OpenAiClient;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared state for all commands and event handlers, wired up once in main.
pub struct Data {
    pub config: Arc<BotConfig>,
    pub filter: Arc<EventFilter>,
    pub activity: Arc<ActivityLogger<FileActivityStore>>,
    pub openai: Arc<OpenAiService<OpenAiClient>>,
    pub exports: Arc<ExportWriter>,
    /// Busy-guard: at most one collection (history or member dump) runs
    /// process-wide. A failed begin() means "please wait", never a queue.
    pub collection_guard: Arc<CollectionGuard>,
}
