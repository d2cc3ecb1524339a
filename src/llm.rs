use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API error (status {status}): {body}")]
    Status { status: u16, body: String },
}

/// Sends a system prompt plus one user turn to a chat model and returns the
/// assistant text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ModelError>;
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

// OpenAI chat completions response, only the parts we read
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatCompletion {
    // first choice's text, trimmed; empty when the model said nothing
    pub fn content(&self) -> String {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}

pub struct OpenAiClient {
    client: reqwest::Client,
    settings: ModelSettings,
}

impl OpenAiClient {
    pub fn new(settings: ModelSettings) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn request_body(&self, system: &str, user: &str) -> serde_json::Value {
        json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "response_format": { "type": "json_object" },
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.settings.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String, ModelError> {
        let url = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&self.request_body(system, user))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = res.json().await?;
        let text = completion.content();
        debug!(chars = text.len(), "model replied");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ModelSettings {
        ModelSettings {
            base_url: "https://api.openai.com/v1".into(),
            api_key: "sk-test".into(),
            model: "gpt-3.5-turbo".into(),
            max_tokens: 400,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn request_body_asks_for_json_object() {
        let client = OpenAiClient::new(settings()).unwrap();
        let body = client.request_body("sys", "User message: hi");

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 400);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "User message: hi");
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn content_takes_first_choice_trimmed() {
        let completion: ChatCompletion = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"  {\"reply\":\"hi\"}\n"}},{"message":{"content":"second"}}]}"#,
        )
        .unwrap();
        assert_eq!(completion.content(), r#"{"reply":"hi"}"#);
    }

    #[test]
    fn content_is_empty_without_choices() {
        let completion: ChatCompletion = serde_json::from_str("{}").unwrap();
        assert_eq!(completion.content(), "");

        let completion: ChatCompletion =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(completion.content(), "");
    }
}
