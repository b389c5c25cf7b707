use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub image_features: String,
}

/// Social platforms a listing can be written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Beike,
    Xiaohongshu,
    Moments,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Beike, Platform::Xiaohongshu, Platform::Moments];

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Beike => "贝壳版",
            Platform::Xiaohongshu => "小红书版",
            Platform::Moments => "朋友圈版",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    #[serde(default)]
    pub house_type: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub community_name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

impl PropertyInfo {
    /// Requested platforms in canonical order without duplicates; all
    /// platforms when none were requested.
    pub fn selected_platforms(&self) -> Vec<Platform> {
        if self.platforms.is_empty() {
            return Platform::ALL.to_vec();
        }
        Platform::ALL
            .into_iter()
            .filter(|p| self.platforms.contains(p))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    pub user_id: Option<Uuid>,
    pub property_info: Option<PropertyInfo>,
    pub image_features: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub selling_points: Vec<String>,
    pub contents: BTreeMap<Platform, String>,
    pub new_points: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSuggestions {
    #[serde(rename = "布局", default)]
    pub layout: String,
    #[serde(rename = "配色", default)]
    pub palette: String,
    #[serde(rename = "材质", default)]
    pub materials: String,
    #[serde(rename = "氛围", default)]
    pub ambience: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub suggestions: RoomSuggestions,
}

/// Floor-plan analysis as returned by the vision model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorPlan {
    pub analysis: String,
    pub rooms: Vec<Room>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub user_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub style: Option<String>,
    pub scene: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    pub analysis: String,
    pub room_suggestions: Vec<Room>,
    pub story_script: String,
    pub style_name: String,
    pub style_en: String,
    pub scene_name: String,
    pub new_points: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub user_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub style_en: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub image_url: String,
}
