use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;

use crate::errors::{AppError, Result};

const DEFAULT_MIME: &str = "image/jpeg";

/// Base64 image payload ready to be sent inline to a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn from_bytes(bytes: &[u8], content_type: Option<&str>) -> Self {
        Self {
            mime_type: image_mime_type(content_type),
            data: STANDARD.encode(bytes),
        }
    }
}

/// Essence of an `image/*` content type, or JPEG when the header is
/// missing or not an image.
pub fn image_mime_type(content_type: Option<&str>) -> String {
    content_type
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .filter(|m| m.type_() == mime::IMAGE)
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_MIME.to_string())
}

/// Downloads a client-hosted image so it can be forwarded inline.
pub async fn fetch_inline_image(http: &Client, url: &str) -> Result<InlineImage> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Image download failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Upstream(format!("Image download failed: {}", status)));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::Upstream(format!("Image download failed: {}", e)))?;

    tracing::debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(InlineImage::from_bytes(&bytes, content_type.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_from_header() {
        assert_eq!(image_mime_type(Some("image/png; charset=binary")), "image/png");
        assert_eq!(image_mime_type(Some("image/webp")), "image/webp");
    }

    #[test]
    fn test_mime_type_defaults_to_jpeg() {
        assert_eq!(image_mime_type(None), "image/jpeg");
        assert_eq!(image_mime_type(Some("text/html")), "image/jpeg");
        assert_eq!(image_mime_type(Some("not a mime")), "image/jpeg");
    }

    #[test]
    fn test_inline_image_encodes_base64() {
        let image = InlineImage::from_bytes(b"ABC", Some("image/png"));
        assert_eq!(image.data, "QUJD");
        assert_eq!(image.mime_type, "image/png");
    }
}
