// Process-wide bot configuration.
//
// Everything here is loaded once in `main` and treated as immutable for the
// rest of the run. Feature toggles and the emoji table collapse the pile of
// near-identical bot variants into one configurable binary.

use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

/// Per-capability on/off switches.
#[derive(Debug, Clone)]
pub struct Features {
    pub chat_reply: bool,
    pub image_ocr: bool,
    pub voice_transcribe: bool,
    pub room_logging: bool,
    pub chat_collect: bool,
    pub member_collect: bool,
    pub room_stats: bool,
    pub basic_greeting: bool,
    pub debug_logging: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            chat_reply: true,
            image_ocr: true,
            voice_transcribe: true,
            room_logging: true,
            chat_collect: true,
            member_collect: true,
            room_stats: true,
            // Conflicts with chat_reply on plain text, so off unless asked for.
            basic_greeting: false,
            debug_logging: true,
        }
    }
}

impl Features {
    /// (name, enabled) pairs for the `/features` listing and startup banner.
    pub fn entries(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("chat_reply", self.chat_reply),
            ("image_ocr", self.image_ocr),
            ("voice_transcribe", self.voice_transcribe),
            ("room_logging", self.room_logging),
            ("chat_collect", self.chat_collect),
            ("member_collect", self.member_collect),
            ("room_stats", self.room_stats),
            ("basic_greeting", self.basic_greeting),
            ("debug_logging", self.debug_logging),
        ]
    }
}

/// A canonical emoji plus the variant code points treated as equivalent.
///
/// Discord delivers skin-toned reactions as distinct symbols; users expect
/// 👍🏽 to behave like 👍, so matching goes through the whole group.
#[derive(Debug, Clone)]
pub struct EmojiGroup {
    pub canonical: String,
    pub variants: Vec<String>,
}

impl EmojiGroup {
    pub fn single(canonical: &str) -> Self {
        Self {
            canonical: canonical.to_string(),
            variants: Vec::new(),
        }
    }

    pub fn with_variants(canonical: &str, variants: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn matches(&self, symbol: &str) -> bool {
        self.canonical == symbol || self.variants.iter().any(|v| v == symbol)
    }
}

/// Emoji assignments per capability, plus the status markers the bot puts on
/// messages while it works.
#[derive(Debug, Clone)]
pub struct ReactionEmojis {
    pub image_ocr: EmojiGroup,
    pub voice_transcribe: EmojiGroup,
    pub chat_collect: EmojiGroup,
    pub member_collect: EmojiGroup,
    pub room_stats: EmojiGroup,
    pub processing: String,
    pub success: String,
    pub error: String,
}

impl Default for ReactionEmojis {
    fn default() -> Self {
        Self {
            image_ocr: EmojiGroup::single("🦀"),
            voice_transcribe: EmojiGroup::single("🎤"),
            chat_collect: EmojiGroup::with_variants(
                "👍",
                &["👍🏻", "👍🏼", "👍🏽", "👍🏾", "👍🏿"],
            ),
            member_collect: EmojiGroup::with_variants("👁️", &["👀", "🔍", "👁‍🗨"]),
            room_stats: EmojiGroup::single("📊"),
            processing: "⏳".to_string(),
            success: "✅".to_string(),
            error: "❌".to_string(),
        }
    }
}

impl ReactionEmojis {
    /// (capability, canonical emoji) pairs for the `/reactions` listing.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("image_ocr", self.image_ocr.canonical.clone()),
            ("voice_transcribe", self.voice_transcribe.canonical.clone()),
            ("chat_collect", self.chat_collect.canonical.clone()),
            ("member_collect", self.member_collect.canonical.clone()),
            ("room_stats", self.room_stats.canonical.clone()),
            ("processing", self.processing.clone()),
            ("success", self.success.clone()),
            ("error", self.error.clone()),
        ]
    }
}

/// What to do when one event matches several triggers at once.
///
/// The source scripts disagreed with each other here, so the choice is
/// explicit configuration rather than an accident of handler ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Every matched trigger runs independently.
    FireAll,
    /// Only the highest-priority match runs.
    FirstWins,
}

/// Case-insensitive keyword tables per keyword-triggered capability.
#[derive(Debug, Clone)]
pub struct KeywordTables {
    pub chat_reply: Vec<String>,
    pub chat_collect: Vec<String>,
    pub member_collect: Vec<String>,
    pub room_stats: Vec<String>,
}

impl Default for KeywordTables {
    fn default() -> Self {
        let to_vec = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self {
            chat_reply: to_vec(&[
                "chatgpt", "gpt", "質問", "おしえて", "教えて", "会話", "話", "ai",
            ]),
            chat_collect: to_vec(&["チャット収集", "履歴収集", "collect history", "ログ収集"]),
            member_collect: to_vec(&["メンバー一覧", "メンバー収集", "collect members"]),
            room_stats: to_vec(&[
                "ルーム統計",
                "room stats",
                "統計",
                "stats",
                "ログ統計",
                "部屋統計",
            ]),
        }
    }
}

/// Model names for the three request shapes.
#[derive(Debug, Clone)]
pub struct Models {
    pub chat: String,
    pub vision: String,
    pub transcription: String,
}

impl Default for Models {
    fn default() -> Self {
        Self {
            chat: "gpt-4".to_string(),
            vision: "gpt-4-vision-preview".to_string(),
            transcription: "whisper-1".to_string(),
        }
    }
}

/// Numeric knobs: token budget, reply chunking, upload ceiling, paging.
#[derive(Debug, Clone)]
pub struct Limits {
    pub max_tokens: u32,
    /// Replies longer than this are split into numbered chunks.
    pub max_message_length: usize,
    /// Files at or under this many bytes are uploaded inline.
    pub upload_limit_bytes: u64,
    /// Messages fetched per history page; a pause follows each full page.
    pub history_page_size: u8,
    pub history_page_pause_secs: u64,
    /// Members fetched per page during a member collection.
    pub member_page_size: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            max_message_length: 1900,
            upload_limit_bytes: 8 * 1024 * 1024,
            history_page_size: 100,
            history_page_pause_secs: 2,
            member_page_size: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// The single channel this bot reacts in. Events elsewhere are dropped.
    pub target_channel_id: u64,
    pub command_prefix: String,
    pub features: Features,
    pub emojis: ReactionEmojis,
    pub trigger_mode: TriggerMode,
    pub keywords: KeywordTables,
    pub models: Models,
    pub limits: Limits,
    /// Directory for activity logs and metadata sidecars.
    pub log_dir: String,
    /// Directory for history/member export files.
    pub export_dir: String,
}

impl BotConfig {
    /// Build the config from the environment. `TARGET_CHANNEL_ID` is the one
    /// required variable; everything else falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let target_channel_id = std::env::var("TARGET_CHANNEL_ID")
            .map_err(|_| ConfigError::MissingVar("TARGET_CHANNEL_ID"))
            .and_then(|v| {
                v.parse::<u64>().map_err(|_| ConfigError::InvalidVar {
                    var: "TARGET_CHANNEL_ID",
                    value: v,
                })
            })?;

        let trigger_mode = match std::env::var("TRIGGER_MODE").ok().as_deref() {
            Some("first_wins") => TriggerMode::FirstWins,
            _ => TriggerMode::FireAll,
        };

        let mut features = Features::default();
        if let Some(enabled) = env_bool("FEATURE_BASIC_GREETING") {
            features.basic_greeting = enabled;
        }
        if let Some(enabled) = env_bool("FEATURE_CHAT_REPLY") {
            features.chat_reply = enabled;
        }
        if let Some(enabled) = env_bool("FEATURE_DEBUG_LOGGING") {
            features.debug_logging = enabled;
        }

        let mut models = Models::default();
        if let Ok(model) = std::env::var("OPENAI_CHAT_MODEL") {
            models.chat = model;
        }
        if let Ok(model) = std::env::var("OPENAI_VISION_MODEL") {
            models.vision = model;
        }

        let mut limits = Limits::default();
        if let Some(max_tokens) = std::env::var("OPENAI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            limits.max_tokens = max_tokens;
        }

        Ok(Self {
            target_channel_id,
            command_prefix: "!".to_string(),
            features,
            emojis: ReactionEmojis::default(),
            trigger_mode,
            keywords: KeywordTables::default(),
            models,
            limits,
            log_dir: std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            export_dir: std::env::var("EXPORT_DIR").unwrap_or_else(|_| "exports".to_string()),
        })
    }

    /// Emoji lookup for the `/reactions` help output, keyed by capability.
    pub fn emoji_descriptions(&self) -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("image_ocr", "extract text from an attached image"),
            ("voice_transcribe", "transcribe an attached audio file"),
            ("chat_collect", "export this channel's message history"),
            ("member_collect", "export the guild member list"),
            ("room_stats", "show activity statistics for this room"),
            ("processing", "work in progress"),
            ("success", "done"),
            ("error", "something went wrong"),
        ])
    }
}

fn env_bool(var: &str) -> Option<bool> {
    std::env::var(var).ok().and_then(|v| v.parse::<bool>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbs_up_variants_match_the_group() {
        let emojis = ReactionEmojis::default();
        for symbol in ["👍", "👍🏻", "👍🏼", "👍🏽", "👍🏾", "👍🏿"] {
            assert!(emojis.chat_collect.matches(symbol), "{symbol} should match");
        }
        assert!(!emojis.chat_collect.matches("👎"));
    }

    #[test]
    fn eye_group_covers_the_lookalikes() {
        let emojis = ReactionEmojis::default();
        assert!(emojis.member_collect.matches("👁️"));
        assert!(emojis.member_collect.matches("👀"));
        assert!(emojis.member_collect.matches("🔍"));
        assert!(!emojis.member_collect.matches("📊"));
    }
}
