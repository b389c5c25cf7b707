use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GeminiEndpoint;
use crate::errors::{AppError, Result};
use crate::services::parsing::extract_image_url;
use crate::utils::image::InlineImage;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseInlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

impl GenerateResponse {
    fn into_parts(self) -> Vec<ResponsePart> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default()
    }
}

/// Client for a Google-style `models/{model}:generateContent` endpoint,
/// used with an inline image for floor-plan analysis and rendering.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: GeminiEndpoint,
}

impl GeminiClient {
    pub fn new(http: Client, endpoint: GeminiEndpoint) -> Self {
        Self { http, endpoint }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_configured()
    }

    /// Concatenated text parts of the first candidate.
    pub async fn generate_text(&self, prompt: &str, image: &InlineImage) -> Result<String> {
        let parts = self
            .generate(&self.endpoint.analysis_model, prompt, image, None)
            .await?;

        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        tracing::debug!("Floor-plan model returned {} chars", text.chars().count());
        Ok(text)
    }

    /// Square rendering derived from `image`, as a `data:` URI or as an
    /// image URL the model put in its text.
    pub async fn generate_image(&self, prompt: &str, image: &InlineImage) -> Result<String> {
        let config = GenerationConfig {
            response_modalities: vec!["IMAGE"],
            image_config: ImageConfig { aspect_ratio: "1:1" },
        };
        let parts = self
            .generate(&self.endpoint.image_model, prompt, image, Some(config))
            .await?;

        for part in parts {
            if let Some(inline) = part.inline_data {
                let mime = inline.mime_type.as_deref().unwrap_or("image/png");
                return Ok(format!("data:{};base64,{}", mime, inline.data));
            }
            if let Some(url) = part.text.as_deref().and_then(extract_image_url) {
                return Ok(url);
            }
        }

        Err(AppError::Upstream("Image model returned no image".to_string()))
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: &InlineImage,
        generation_config: Option<GenerationConfig>,
    ) -> Result<Vec<ResponsePart>> {
        let api_key = self
            .endpoint
            .api_key
            .as_deref()
            .ok_or(AppError::NotConfigured("Gemini model"))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.base_url.trim_end_matches('/'),
            model
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::Text { text: prompt },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: &image.mime_type,
                            data: &image.data,
                        },
                    },
                ],
            }],
            generation_config,
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Gemini model {} returned {}: {}", model, status, body);
            return Err(AppError::Upstream(format!("Gemini returned {}", status)));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Gemini response: {}", e)))?;

        Ok(body.into_parts())
    }
}
