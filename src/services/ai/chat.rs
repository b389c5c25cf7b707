use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ChatEndpoint;
use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.into()),
        }
    }

    /// User turn carrying image URLs followed by the text prompt.
    pub fn user_with_images(images: &[String], text: impl Into<String>) -> Self {
        let mut parts: Vec<ContentPart> = images
            .iter()
            .map(|url| ContentPart::ImageUrl {
                image_url: ImageUrl { url: url.clone() },
            })
            .collect();
        parts.push(ContentPart::Text { text: text.into() });

        Self {
            role: "user",
            content: MessageContent::Parts(parts),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible `chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    endpoint: ChatEndpoint,
    name: &'static str,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl ChatClient {
    pub fn new(http: Client, endpoint: ChatEndpoint, name: &'static str) -> Self {
        Self {
            http,
            endpoint,
            name,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = Some(max_tokens);
        self.temperature = Some(temperature);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_configured()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Sends the conversation and returns the first choice's text, trimmed.
    /// An empty string means the model answered with no content.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let (url, api_key) = match (&self.endpoint.url, &self.endpoint.api_key) {
            (Some(url), Some(key)) => (url, key),
            _ => return Err(AppError::NotConfigured(self.name)),
        };

        let request = CompletionRequest {
            model: &self.endpoint.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("{} request failed: {}", self.name, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("{} returned {}: {}", self.name, status, body);
            return Err(AppError::Upstream(format!("{} returned {}", self.name, status)));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("{} response: {}", self.name, e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        tracing::debug!("{} returned {} chars", self.name, content.chars().count());
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_message_serializes_openai_parts() {
        let message = ChatMessage::user_with_images(
            &["https://img.example.com/1.jpg".to_string()],
            "describe",
        );
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(
            value,
            json!({
                "role": "user",
                "content": [
                    {"type": "image_url", "image_url": {"url": "https://img.example.com/1.jpg"}},
                    {"type": "text", "text": "describe"}
                ]
            })
        );
    }

    #[test]
    fn test_plain_message_serializes_as_string() {
        let value = serde_json::to_value(ChatMessage::system("be brief")).unwrap();
        assert_eq!(value, json!({"role": "system", "content": "be brief"}));
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_fast() {
        let client = ChatClient::new(
            Client::new(),
            ChatEndpoint {
                url: None,
                api_key: None,
                model: "glm-4.6v".to_string(),
            },
            "Vision model",
        );

        let result = client.complete(&[ChatMessage::user("hi")]).await;
        assert!(matches!(result, Err(AppError::NotConfigured("Vision model"))));
    }
}
