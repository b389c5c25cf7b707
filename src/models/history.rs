use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GenerationHistory {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub input_images: Vec<String>,
    pub property_info: Option<serde_json::Value>,
    pub listing_result: Option<serde_json::Value>,
    pub style_name: Option<String>,
    pub scene_name: Option<String>,
    pub layout_result: Option<serde_json::Value>,
    pub birdview_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Listing,
    Layout,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Listing => "listing",
            HistoryKind::Layout => "layout",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub user_id: Uuid,
    pub kind: HistoryKind,
    pub input_images: Vec<String>,
    pub property_info: Option<serde_json::Value>,
    pub listing_result: Option<serde_json::Value>,
    pub style_name: Option<String>,
    pub scene_name: Option<String>,
    pub layout_result: Option<serde_json::Value>,
    pub birdview_image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveHistoryRequest {
    pub user_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: Option<HistoryKind>,
    #[serde(default)]
    pub input_images: Vec<String>,
    pub property_info: Option<serde_json::Value>,
    pub listing_result: Option<serde_json::Value>,
    pub style_name: Option<String>,
    pub scene_name: Option<String>,
    pub layout_result: Option<serde_json::Value>,
    pub birdview_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<GenerationHistory>,
}
