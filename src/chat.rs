use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Asks for exactly four labelled lines: English term, Arabic-letter
/// pronunciation, Arabic meaning, Arabic definition.
pub const DEFINITION_INSTRUCTION: &str = "اكتب فقط 4 أسطر بهذا الشكل:\nEnglish term: ...\nPronunciation (Arabic letters): ...\nالمعنى بالعربي: ...\nالتعريف بالعربي: ...";

pub fn definition_prompt(term: &str) -> String {
    format!("المصطلح: {term}")
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("chat response is not json: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    url: String,
    model: String,
    temperature: f64,
}

impl ChatClient {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, model, temperature))
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        model: impl Into<String>,
        temperature: f64,
    ) -> Self {
        let url = format!("{}{COMPLETIONS_PATH}", base_url.trim_end_matches('/'));
        Self {
            client,
            url,
            model: model.into(),
            temperature,
        }
    }

    /// Generates the four-line definition for `term`. The text is returned
    /// as the model wrote it.
    pub async fn define(&self, api_key: &str, term: &str) -> Result<String, ChatError> {
        self.complete(api_key, DEFINITION_INSTRUCTION, &definition_prompt(term))
            .await
    }

    async fn complete(&self, api_key: &str, system: &str, user: &str) -> Result<String, ChatError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let res = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(ChatError::Status { status, body });
        }

        let value: Value = serde_json::from_str(&body)?;
        Ok(completion_text(&value))
    }
}

/// `choices[0].message.content`, or empty when the response has no such field.
fn completion_text(value: &Value) -> String {
    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
