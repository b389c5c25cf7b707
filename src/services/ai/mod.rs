pub mod chat;
pub mod gemini;

pub use chat::{ChatClient, ChatMessage};
pub use gemini::GeminiClient;

use anyhow::Result;
use reqwest::Client;

use crate::config::AiConfig;

/// Provider clients sharing one connection pool.
#[derive(Clone)]
pub struct AiClients {
    /// Plain HTTP client, also used to download floor plans.
    pub http: Client,
    pub vision: ChatClient,
    pub chat: ChatClient,
    pub gemini: GeminiClient,
}

impl AiClients {
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            vision: ChatClient::new(http.clone(), config.vision.clone(), "Vision model")
                .with_sampling(500, 0.7),
            chat: ChatClient::new(http.clone(), config.chat.clone(), "Chat model")
                .with_sampling(2000, 0.8),
            gemini: GeminiClient::new(http.clone(), config.gemini.clone()),
            http,
        })
    }
}
