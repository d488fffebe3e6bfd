// Reqwest-backed OpenAI client covering the three request shapes the bot
// needs: chat completion, vision-on-image and audio transcription.

use crate::core::openai::{ChatMessage, OpenAiError, OpenAiProvider, TranscriptionRequest};
use async_trait::async_trait;
use base64::Engine;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::json;

const API_BASE: &str = "https://api.openai.com/v1";

pub struct OpenAiClient {
    client: Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            // Keys pasted into .env files pick up stray whitespace easily.
            api_key: api_key.trim().to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Extract `choices[0].message.content` from a completion response.
    fn completion_text(body: serde_json::Value) -> Result<String, OpenAiError> {
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| OpenAiError::BadResponse("no message content in completion".into()))
    }
}

/// Map a non-success HTTP response to the typed failure taxonomy.
fn classify_error(status: u16, body: &str) -> OpenAiError {
    let detail: serde_json::Value = serde_json::from_str(body).unwrap_or_default();
    let code = detail["error"]["code"].as_str().unwrap_or_default();
    let message = detail["error"]["message"]
        .as_str()
        .unwrap_or(body)
        .to_string();

    match status {
        401 => OpenAiError::InvalidCredential,
        429 if code == "insufficient_quota" => OpenAiError::QuotaExceeded,
        429 => OpenAiError::RateLimited,
        404 if code == "model_not_found" => OpenAiError::ModelUnavailable(message),
        404 => OpenAiError::ModelUnavailable(message),
        _ => OpenAiError::Api { status, message },
    }
}

async fn parse_response(response: reqwest::Response) -> Result<serde_json::Value, OpenAiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_error(status.as_u16(), &body));
    }
    response
        .json()
        .await
        .map_err(|e| OpenAiError::Transport(e.to_string()))
}

#[async_trait]
impl OpenAiProvider for OpenAiClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
        max_tokens: u32,
    ) -> Result<String, OpenAiError> {
        let payload = json!({
            "model": model,
            "messages": messages,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(format!("{API_BASE}/chat/completions"))
            .header("Authorization", self.auth_header())
            .json(&payload)
            .send()
            .await
            .map_err(|e| OpenAiError::Transport(e.to_string()))?;

        Self::completion_text(parse_response(response).await?)
    }

    async fn vision(
        &self,
        prompt: &str,
        image: &[u8],
        model: &str,
        max_tokens: u32,
    ) -> Result<String, OpenAiError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let payload = json!({
            "model": model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:image/jpeg;base64,{encoded}") }
                    }
                ]
            }],
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(format!("{API_BASE}/chat/completions"))
            .header("Authorization", self.auth_header())
            .json(&payload)
            .send()
            .await
            .map_err(|e| OpenAiError::Transport(e.to_string()))?;

        Self::completion_text(parse_response(response).await?)
    }

    async fn transcribe(
        &self,
        request: &TranscriptionRequest,
        model: &str,
    ) -> Result<String, OpenAiError> {
        let file_part = Part::bytes(request.audio.clone())
            .file_name(request.filename.clone())
            .mime_str("application/octet-stream")
            .map_err(|e| OpenAiError::Transport(e.to_string()))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", model.to_string())
            .text("response_format", "text");
        if let Some(language) = &request.language {
            form = form.text("language", language.clone());
        }
        if let Some(prompt) = &request.prompt {
            form = form.text("prompt", prompt.clone());
        }

        let response = self
            .client
            .post(format!("{API_BASE}/audio/transcriptions"))
            .header("Authorization", self.auth_header())
            .multipart(form)
            .send()
            .await
            .map_err(|e| OpenAiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &body));
        }

        // response_format=text means the body is the transcript itself.
        let text = response
            .text()
            .await
            .map_err(|e| OpenAiError::Transport(e.to_string()))?;
        Ok(text.trim().to_string())
    }
}
