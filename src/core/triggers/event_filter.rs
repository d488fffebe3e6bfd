// The event filter decides, per inbound event, whether the bot acts at all
// and which triggers matched. It is a pure decision function: no I/O, no
// side effects. Callers do the logging and dispatching.

use super::trigger_models::{
    is_audio_filename, is_image_filename, MessageEvent, ReactionEvent, Trigger,
};
use crate::core::config::{BotConfig, TriggerMode};
use std::sync::Arc;

pub struct EventFilter {
    config: Arc<BotConfig>,
}

impl EventFilter {
    pub fn new(config: Arc<BotConfig>) -> Self {
        Self { config }
    }

    /// True when the event is in the one channel the bot watches.
    fn in_scope(&self, channel_id: u64) -> bool {
        channel_id == self.config.target_channel_id
    }

    /// All triggers a message matches, in priority order.
    ///
    /// An empty result means the event is silently dropped. BasicReply is
    /// only ever produced on its own: any other match suppresses it.
    pub fn filter_message(&self, event: &MessageEvent, bot_user_id: u64) -> Vec<Trigger> {
        // Never react to ourselves or other bots; that way lies feedback loops.
        if event.author_is_bot || event.author_id == bot_user_id {
            return Vec::new();
        }
        if !self.in_scope(event.channel_id) {
            return Vec::new();
        }

        let features = &self.config.features;
        let keywords = &self.config.keywords;
        let content_lower = event.content.to_lowercase();
        let mut matched = Vec::new();

        if features.image_ocr && event.attachment_names.iter().any(|n| is_image_filename(n)) {
            matched.push(Trigger::ImageOcr);
        }
        if features.voice_transcribe
            && event.attachment_names.iter().any(|n| is_audio_filename(n))
        {
            matched.push(Trigger::VoiceTranscribe);
        }

        let is_command = event.content.starts_with(&self.config.command_prefix);
        if !event.content.is_empty() && !is_command {
            if features.chat_collect && contains_any(&content_lower, &keywords.chat_collect) {
                matched.push(Trigger::ChatCollect);
            }
            if features.member_collect && contains_any(&content_lower, &keywords.member_collect) {
                matched.push(Trigger::MemberCollect);
            }
            if features.room_stats && contains_any(&content_lower, &keywords.room_stats) {
                matched.push(Trigger::RoomStats);
            }
            if features.chat_reply && contains_any(&content_lower, &keywords.chat_reply) {
                matched.push(Trigger::ChatReply);
            }

            // The greeting is a fallback, not a peer: it only fires when no
            // other trigger claimed the message.
            if matched.is_empty() && features.basic_greeting {
                matched.push(Trigger::BasicReply);
            }
        }

        if self.config.trigger_mode == TriggerMode::FirstWins {
            matched.truncate(1);
        }

        matched
    }

    /// The trigger a reaction matches, if any. Reactions map to at most one
    /// action because the emoji groups are disjoint.
    pub fn filter_reaction(&self, event: &ReactionEvent, bot_user_id: u64) -> Option<Trigger> {
        if event.user_is_bot || event.user_id == bot_user_id {
            return None;
        }
        if !self.in_scope(event.channel_id) {
            return None;
        }

        let features = &self.config.features;
        let emojis = &self.config.emojis;
        let symbol = event.emoji.as_str();

        if features.image_ocr && emojis.image_ocr.matches(symbol) {
            return Some(Trigger::ImageOcr);
        }
        if features.voice_transcribe && emojis.voice_transcribe.matches(symbol) {
            return Some(Trigger::VoiceTranscribe);
        }
        if features.chat_collect && emojis.chat_collect.matches(symbol) {
            return Some(Trigger::ChatCollect);
        }
        if features.member_collect && emojis.member_collect.matches(symbol) {
            return Some(Trigger::MemberCollect);
        }
        if features.room_stats && emojis.room_stats.matches(symbol) {
            return Some(Trigger::RoomStats);
        }

        None
    }

    /// Whether a message should be appended to the activity log. Separate
    /// from trigger matching: plain chatter is logged even when it fires no
    /// action, commands and empty uploads are not.
    pub fn should_log(&self, event: &MessageEvent, bot_user_id: u64) -> bool {
        if !self.config.features.room_logging {
            return false;
        }
        if event.author_is_bot || event.author_id == bot_user_id {
            return false;
        }
        if !self.in_scope(event.channel_id) {
            return false;
        }
        !event.content.is_empty() && !event.content.starts_with(&self.config.command_prefix)
    }
}

fn contains_any(haystack_lower: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|needle| haystack_lower.contains(&needle.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{BotConfig, Features, KeywordTables, Limits, Models, ReactionEmojis};

    const CHANNEL: u64 = 4242;
    const BOT_ID: u64 = 99;

    fn test_config() -> BotConfig {
        BotConfig {
            target_channel_id: CHANNEL,
            command_prefix: "!".to_string(),
            features: Features::default(),
            emojis: ReactionEmojis::default(),
            trigger_mode: TriggerMode::FireAll,
            keywords: KeywordTables::default(),
            models: Models::default(),
            limits: Limits::default(),
            log_dir: "logs".to_string(),
            export_dir: "exports".to_string(),
        }
    }

    fn filter_with(config: BotConfig) -> EventFilter {
        EventFilter::new(Arc::new(config))
    }

    fn message(content: &str) -> MessageEvent {
        MessageEvent {
            channel_id: CHANNEL,
            author_id: 1,
            author_is_bot: false,
            content: content.to_string(),
            attachment_names: Vec::new(),
        }
    }

    fn reaction(emoji: &str) -> ReactionEvent {
        ReactionEvent {
            channel_id: CHANNEL,
            user_id: 1,
            user_is_bot: false,
            emoji: emoji.to_string(),
        }
    }

    #[test]
    fn wrong_channel_matches_nothing() {
        let filter = filter_with(test_config());
        let mut event = message("room stats please");
        event.channel_id = CHANNEL + 1;

        assert!(filter.filter_message(&event, BOT_ID).is_empty());
        assert!(!filter.should_log(&event, BOT_ID));

        let mut react = reaction("👍");
        react.channel_id = CHANNEL + 1;
        assert_eq!(filter.filter_reaction(&react, BOT_ID), None);
    }

    #[test]
    fn own_and_bot_events_are_rejected() {
        let filter = filter_with(test_config());

        let mut own = message("stats");
        own.author_id = BOT_ID;
        assert!(filter.filter_message(&own, BOT_ID).is_empty());

        let mut bot = message("stats");
        bot.author_is_bot = true;
        assert!(filter.filter_message(&bot, BOT_ID).is_empty());

        let mut react = reaction("👍");
        react.user_is_bot = true;
        assert_eq!(filter.filter_reaction(&react, BOT_ID), None);
    }

    #[test]
    fn plain_empty_and_command_messages() {
        // Of "hello", "" and "!ping", only "hello" is loggable; none of the
        // three fires a keyword trigger.
        let filter = filter_with(test_config());

        let hello = message("hello");
        assert!(filter.filter_message(&hello, BOT_ID).is_empty());
        assert!(filter.should_log(&hello, BOT_ID));

        let empty = message("");
        assert!(filter.filter_message(&empty, BOT_ID).is_empty());
        assert!(!filter.should_log(&empty, BOT_ID));

        let command = message("!ping");
        assert!(filter.filter_message(&command, BOT_ID).is_empty());
        assert!(!filter.should_log(&command, BOT_ID));
    }

    #[test]
    fn keyword_matching_is_case_insensitive() {
        let filter = filter_with(test_config());
        let event = message("Room STATS when?");
        assert_eq!(
            filter.filter_message(&event, BOT_ID),
            vec![Trigger::RoomStats]
        );
    }

    #[test]
    fn attachments_trigger_by_extension() {
        let filter = filter_with(test_config());

        let mut event = message("");
        event.attachment_names = vec!["Screenshot.PNG".to_string()];
        assert_eq!(filter.filter_message(&event, BOT_ID), vec![Trigger::ImageOcr]);

        let mut event = message("");
        event.attachment_names = vec!["memo.m4a".to_string()];
        assert_eq!(
            filter.filter_message(&event, BOT_ID),
            vec![Trigger::VoiceTranscribe]
        );
    }

    #[test]
    fn fire_all_returns_every_match_in_priority_order() {
        let filter = filter_with(test_config());
        let mut event = message("gptに統計を教えて");
        event.attachment_names = vec!["photo.jpg".to_string()];

        assert_eq!(
            filter.filter_message(&event, BOT_ID),
            vec![Trigger::ImageOcr, Trigger::RoomStats, Trigger::ChatReply]
        );
    }

    #[test]
    fn first_wins_keeps_only_the_top_match() {
        let mut config = test_config();
        config.trigger_mode = TriggerMode::FirstWins;
        let filter = filter_with(config);

        let mut event = message("gptに統計を教えて");
        event.attachment_names = vec!["photo.jpg".to_string()];
        assert_eq!(filter.filter_message(&event, BOT_ID), vec![Trigger::ImageOcr]);
    }

    #[test]
    fn greeting_only_fires_alone() {
        let mut config = test_config();
        config.features.basic_greeting = true;
        let filter = filter_with(config);

        assert_eq!(
            filter.filter_message(&message("hello"), BOT_ID),
            vec![Trigger::BasicReply]
        );
        // A keyword match suppresses the greeting entirely.
        assert_eq!(
            filter.filter_message(&message("room stats"), BOT_ID),
            vec![Trigger::RoomStats]
        );
    }

    #[test]
    fn skin_tone_variants_trigger_the_same_collection() {
        let filter = filter_with(test_config());
        for symbol in ["👍", "👍🏽", "👍🏿"] {
            assert_eq!(
                filter.filter_reaction(&reaction(symbol), BOT_ID),
                Some(Trigger::ChatCollect),
                "{symbol} should start a history collection"
            );
        }
    }

    #[test]
    fn disabled_feature_never_triggers() {
        let mut config = test_config();
        config.features.chat_collect = false;
        let filter = filter_with(config);

        assert_eq!(filter.filter_reaction(&reaction("👍"), BOT_ID), None);
        assert!(filter
            .filter_message(&message("collect history"), BOT_ID)
            .is_empty());
    }
}
