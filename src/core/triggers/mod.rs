pub mod event_filter;
pub mod trigger_models;

pub use event_filter::EventFilter;
pub use trigger_models::{MessageEvent, ReactionEvent, Trigger};
