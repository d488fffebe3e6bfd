pub mod models;
pub mod openai_service;

pub use models::{ChatMessage, OpenAiError, TranscriptionRequest};
pub use openai_service::{OpenAiProvider, OpenAiService};
