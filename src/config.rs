use anyhow::Result;
use std::env;
use std::time::Duration;

use crate::services::retry::{Backoff, RetryPolicy};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub max_body_bytes: usize,
    pub pricing: PricingConfig,
    pub history_limit: i64,
    pub refund_on_failure: bool,
    pub ai: AiConfig,
}

#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub registration_bonus: i32,
    pub listing_cost_per_platform: i32,
    pub layout_cost: i32,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    /// OpenAI-style vision model used to describe listing photos.
    pub vision: ChatEndpoint,
    /// OpenAI-style text model used for copywriting and scene stories.
    pub chat: ChatEndpoint,
    pub gemini: GeminiEndpoint,
    pub timeout: Duration,
    pub render_retry: RetryPolicy,
}

#[derive(Debug, Clone)]
pub struct ChatEndpoint {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
}

impl ChatEndpoint {
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.api_key.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct GeminiEndpoint {
    pub base_url: String,
    pub api_key: Option<String>,
    pub analysis_model: String,
    pub image_model: String,
}

impl GeminiEndpoint {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let render_delay = Duration::from_secs(
            env::var("RENDER_RETRY_DELAY_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
        );
        let render_backoff = match env::var("RENDER_BACKOFF")
            .unwrap_or_else(|_| "fixed".to_string())
            .as_str()
        {
            "exponential" => Backoff::Exponential {
                base: render_delay,
                max: Duration::from_secs(60),
            },
            _ => Backoff::Fixed(render_delay),
        };

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/listing_studio".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key".to_string()),
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| "2097152".to_string()) // 2MB
                .parse()?,
            pricing: PricingConfig {
                registration_bonus: env::var("REGISTRATION_BONUS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
                listing_cost_per_platform: env::var("LISTING_COST_PER_PLATFORM")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()?,
                layout_cost: env::var("LAYOUT_COST")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()?,
            },
            history_limit: env::var("HISTORY_LIMIT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            refund_on_failure: env::var("REFUND_ON_FAILURE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()?,
            ai: AiConfig {
                vision: ChatEndpoint {
                    url: env::var("VISION_API_URL").ok(),
                    api_key: env::var("VISION_API_KEY").ok(),
                    model: env::var("VISION_MODEL")
                        .unwrap_or_else(|_| "glm-4.6v".to_string()),
                },
                chat: ChatEndpoint {
                    url: Some(
                        env::var("CHAT_API_URL")
                            .unwrap_or_else(|_| "https://api.deepseek.com/chat/completions".to_string()),
                    ),
                    api_key: env::var("CHAT_API_KEY").ok(),
                    model: env::var("CHAT_MODEL")
                        .unwrap_or_else(|_| "deepseek-chat".to_string()),
                },
                gemini: GeminiEndpoint {
                    base_url: env::var("GEMINI_API_BASE")
                        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
                    api_key: env::var("GEMINI_API_KEY").ok(),
                    analysis_model: env::var("GEMINI_MODEL")
                        .unwrap_or_else(|_| "gemini-2.5-flash-image".to_string()),
                    image_model: env::var("GEMINI_IMAGE_MODEL")
                        .unwrap_or_else(|_| "gemini-2.5-flash-image".to_string()),
                },
                timeout: Duration::from_secs(
                    env::var("AI_TIMEOUT_SECS")
                        .unwrap_or_else(|_| "120".to_string())
                        .parse()?,
                ),
                render_retry: RetryPolicy {
                    max_attempts: env::var("RENDER_MAX_ATTEMPTS")
                        .unwrap_or_else(|_| "3".to_string())
                        .parse()?,
                    backoff: render_backoff,
                },
            },
        })
    }
}
