pub mod collection_guard;
pub mod export_models;
pub mod render;

pub use collection_guard::CollectionGuard;
pub use export_models::{HistoryRecord, MemberRecord};
pub use render::{
    history_json, history_text, member_csv, member_text, sanitize_filename, UploadDecision,
};
