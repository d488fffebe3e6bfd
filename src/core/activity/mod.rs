pub mod activity_logger;
pub mod activity_models;

pub use activity_logger::{ActivityError, ActivityLogger, ActivityStore};
pub use activity_models::{LogEntry, LogMetadata, ReactionSummary};
