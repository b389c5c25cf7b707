//! Cleanup and strict decoding of model output.

use crate::models::FloorPlan;

pub const DEFAULT_SELLING_POINTS: [&str; 5] = [
    "• 优质房源",
    "• 交通便利",
    "• 装修精美",
    "• 配套齐全",
    "• 性价比高",
];

const BULLET: char = '•';
const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".webp"];

/// Floor-plan decoding result: either the validated structure or the raw
/// text that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloorPlanParse {
    Parsed(FloorPlan),
    ParseError { raw: String, reason: String },
}

/// Removes ```json / ``` fences that models wrap around JSON payloads.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

pub fn parse_floor_plan(text: &str) -> FloorPlanParse {
    let cleaned = strip_code_fences(text);
    match serde_json::from_str::<FloorPlan>(&cleaned) {
        Ok(plan) => FloorPlanParse::Parsed(plan),
        Err(e) => FloorPlanParse::ParseError {
            raw: cleaned,
            reason: e.to_string(),
        },
    }
}

/// Lines of the model output that start with a bullet, falling back to the
/// generic selling points when there are none.
pub fn extract_selling_points(text: &str) -> Vec<String> {
    let points: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(BULLET))
        .map(str::to_string)
        .collect();

    if points.is_empty() {
        DEFAULT_SELLING_POINTS.iter().map(|p| p.to_string()).collect()
    } else {
        points
    }
}

/// Drops markdown emphasis and heading markers so the text pastes cleanly
/// into chat apps.
pub fn strip_markdown(text: &str) -> String {
    let without_emphasis = text.replace('*', "");
    without_emphasis
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let hashes = trimmed.chars().take_while(|c| *c == '#').count();
            if (1..=6).contains(&hashes) {
                trimmed[hashes..].trim_start()
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// First http(s) URL in `text` that points at an image file.
pub fn extract_image_url(text: &str) -> Option<String> {
    text.split(|c: char| c.is_whitespace() || c == '"' || c == '\'')
        .filter_map(|token| {
            let start = token.find("https://").or_else(|| token.find("http://"))?;
            let candidate = &token[start..];
            let lower = candidate.to_ascii_lowercase();
            let end = IMAGE_EXTENSIONS
                .iter()
                .filter_map(|ext| lower.rfind(ext).map(|pos| pos + ext.len()))
                .max()?;
            Some(candidate[..end].to_string())
        })
        .next()
}
