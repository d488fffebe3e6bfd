// Uniform front door for the three OpenAI request shapes the bot uses.
//
// The provider trait is the seam; the reqwest client lives in infra/. The
// service owns the retry policy and the per-channel conversation window for
// the chat-reply feature, so the Discord layer stays a thin translator.

use super::models::{ChatMessage, OpenAiError, TranscriptionRequest};
use crate::core::config::{Limits, Models};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

/// Rate-limit responses get this many attempts in total; everything else is
/// a single attempt.
const RATE_LIMIT_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// How many past exchanges are sent along with a new chat message, and how
/// many are kept per channel.
const HISTORY_SENT: usize = 5;
const HISTORY_KEPT: usize = 10;

#[async_trait]
pub trait OpenAiProvider: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
        max_tokens: u32,
    ) -> Result<String, OpenAiError>;

    /// Vision-on-image: prompt plus raw image bytes.
    async fn vision(
        &self,
        prompt: &str,
        image: &[u8],
        model: &str,
        max_tokens: u32,
    ) -> Result<String, OpenAiError>;

    async fn transcribe(
        &self,
        request: &TranscriptionRequest,
        model: &str,
    ) -> Result<String, OpenAiError>;
}

/// One user/assistant round-trip kept for chat context.
#[derive(Debug, Clone)]
struct Exchange {
    user: String,
    assistant: String,
}

pub struct OpenAiService<P: OpenAiProvider> {
    provider: P,
    models: Models,
    max_tokens: u32,
    system_prompt: String,
    // Channel id -> recent exchanges, newest at the back.
    history: DashMap<u64, VecDeque<Exchange>>,
}

impl<P: OpenAiProvider> OpenAiService<P> {
    pub fn new(provider: P, models: Models, limits: &Limits, system_prompt: String) -> Self {
        Self {
            provider,
            models,
            max_tokens: limits.max_tokens,
            system_prompt,
            history: DashMap::new(),
        }
    }

    /// Chat completion over an explicit message list. Retries on 429 only.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, OpenAiError> {
        with_rate_limit_retry(|| {
            self.provider
                .chat(messages, &self.models.chat, self.max_tokens)
        })
        .await
    }

    /// Chat completion for the reply feature: system prompt + the channel's
    /// recent exchanges + the new message. The result is folded back into
    /// the history window.
    pub async fn chat_reply(
        &self,
        channel_id: u64,
        user_name: &str,
        text: &str,
    ) -> Result<String, OpenAiError> {
        let mut messages = vec![ChatMessage::system(&self.system_prompt)];
        if let Some(past) = self.history.get(&channel_id) {
            for exchange in past.iter().rev().take(HISTORY_SENT).rev() {
                messages.push(ChatMessage::user(&exchange.user));
                messages.push(ChatMessage::assistant(&exchange.assistant));
            }
        }
        messages.push(ChatMessage::user(format!("{user_name}: {text}")));

        let answer = self.chat(&messages).await?;

        let mut past = self.history.entry(channel_id).or_default();
        past.push_back(Exchange {
            user: format!("{user_name}: {text}"),
            assistant: answer.clone(),
        });
        while past.len() > HISTORY_KEPT {
            past.pop_front();
        }

        Ok(answer)
    }

    /// Extract the text contained in an image.
    pub async fn extract_image_text(&self, image: &[u8]) -> Result<String, OpenAiError> {
        const OCR_PROMPT: &str = "Read every piece of text in this image and transcribe it \
             exactly as written. Return only the transcribed text, with no commentary.";
        with_rate_limit_retry(|| {
            self.provider
                .vision(OCR_PROMPT, image, &self.models.vision, self.max_tokens)
        })
        .await
    }

    pub async fn transcribe(&self, request: &TranscriptionRequest) -> Result<String, OpenAiError> {
        with_rate_limit_retry(|| self.provider.transcribe(request, &self.models.transcription))
            .await
    }
}

/// Run `call`, retrying with doubling backoff while it reports a rate
/// limit. Any other outcome is returned as-is on the first attempt.
async fn with_rate_limit_retry<T, Fut>(
    mut call: impl FnMut() -> Fut,
) -> Result<T, OpenAiError>
where
    Fut: Future<Output = Result<T, OpenAiError>>,
{
    let mut delay = INITIAL_BACKOFF;
    let mut attempt = 1;
    loop {
        match call().await {
            Err(err) if err.is_rate_limited() && attempt < RATE_LIMIT_ATTEMPTS => {
                tracing::warn!(attempt, "rate limited, backing off for {:?}", delay);
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedProvider {
        calls: AtomicU32,
        /// How many leading calls answer RateLimited before succeeding.
        rate_limited_first: u32,
        terminal: Option<fn() -> OpenAiError>,
    }

    impl ScriptedProvider {
        fn rate_limited(times: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                rate_limited_first: times,
                terminal: None,
            }
        }

        fn failing(err: fn() -> OpenAiError) -> Self {
            Self {
                calls: AtomicU32::new(0),
                rate_limited_first: 0,
                terminal: Some(err),
            }
        }

        fn answer(&self) -> Result<String, OpenAiError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(make_err) = self.terminal {
                return Err(make_err());
            }
            if call < self.rate_limited_first {
                Err(OpenAiError::RateLimited)
            } else {
                Ok("ok".to_string())
            }
        }
    }

    #[async_trait]
    impl OpenAiProvider for ScriptedProvider {
        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _model: &str,
            _max_tokens: u32,
        ) -> Result<String, OpenAiError> {
            self.answer()
        }

        async fn vision(
            &self,
            _prompt: &str,
            _image: &[u8],
            _model: &str,
            _max_tokens: u32,
        ) -> Result<String, OpenAiError> {
            self.answer()
        }

        async fn transcribe(
            &self,
            _request: &TranscriptionRequest,
            _model: &str,
        ) -> Result<String, OpenAiError> {
            self.answer()
        }
    }

    fn service(provider: ScriptedProvider) -> OpenAiService<ScriptedProvider> {
        OpenAiService::new(
            provider,
            Models::default(),
            &Limits::default(),
            "test prompt".to_string(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_is_retried_then_succeeds() {
        let svc = service(ScriptedProvider::rate_limited(2));
        let out = svc.chat(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(out, "ok");
        assert_eq!(svc.provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_gives_up_after_bounded_attempts() {
        let svc = service(ScriptedProvider::rate_limited(10));
        let err = svc.chat(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(
            svc.provider.calls.load(Ordering::SeqCst),
            RATE_LIMIT_ATTEMPTS
        );
    }

    #[tokio::test]
    async fn credential_errors_are_not_retried() {
        let svc = service(ScriptedProvider::failing(|| OpenAiError::InvalidCredential));
        let err = svc.chat(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, OpenAiError::InvalidCredential));
        assert_eq!(svc.provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn chat_reply_keeps_a_bounded_window() {
        let svc = service(ScriptedProvider::rate_limited(0));
        for i in 0..15 {
            svc.chat_reply(1, "alice", &format!("message {i}"))
                .await
                .unwrap();
        }
        let window = svc.history.get(&1).unwrap();
        assert_eq!(window.len(), HISTORY_KEPT);
        assert_eq!(window.back().unwrap().user, "alice: message 14");
    }
}
