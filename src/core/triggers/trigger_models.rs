// Inbound-event snapshots for the filter.
//
// The filter works with primitive types only (no serenity imports) so the
// decision logic can be exercised without a gateway connection.

/// A recognized trigger, in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ImageOcr,
    VoiceTranscribe,
    ChatCollect,
    MemberCollect,
    RoomStats,
    ChatReply,
    /// Canned greeting; only fires when nothing else matched.
    BasicReply,
}

/// The slice of a message event the filter cares about.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub channel_id: u64,
    pub author_id: u64,
    pub author_is_bot: bool,
    pub content: String,
    /// Attachment filenames, used for image/audio detection.
    pub attachment_names: Vec<String>,
}

/// The slice of a reaction event the filter cares about.
#[derive(Debug, Clone)]
pub struct ReactionEvent {
    pub channel_id: u64,
    pub user_id: u64,
    pub user_is_bot: bool,
    /// The emoji as the gateway delivered it (unicode symbol).
    pub emoji: String,
}

pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".bmp", ".webp"];
pub const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".ogg", ".m4a", ".flac"];

pub fn is_image_filename(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

pub fn is_audio_filename(name: &str) -> bool {
    let lower = name.to_lowercase();
    AUDIO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
