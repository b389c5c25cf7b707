use axum::{extract::State, response::Json};

use crate::{
    errors::{AppError, Result},
    handlers::{refund_on_error, require_user, AppState},
    middleware::AppJson,
    models::{AnalyzeRequest, AnalyzeResponse, FloorPlan, LayoutRequest, LayoutResponse},
    services::{
        ai::ChatMessage,
        parsing::{parse_floor_plan, strip_markdown, FloorPlanParse},
        prompts::{self, Scene, Style},
    },
    utils::image::fetch_inline_image,
};

const MAX_ANALYZED_PHOTOS: usize = 3;

/// Free photo description. Any provider problem degrades to a generic
/// description instead of failing the request.
pub async fn analyze_photos(
    State(state): State<AppState>,
    AppJson(request): AppJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>> {
    let images: Vec<String> = request
        .images
        .into_iter()
        .filter(|url| !url.trim().is_empty())
        .take(MAX_ANALYZED_PHOTOS)
        .collect();

    if images.is_empty() {
        return Err(AppError::Validation("Please upload at least one image".to_string()));
    }

    let vision = &state.ai.vision;
    let image_features = if !vision.is_configured() {
        tracing::warn!("{} is not configured, using default description", vision.name());
        prompts::IMAGE_FEATURES_FALLBACK.to_string()
    } else {
        let messages = [ChatMessage::user_with_images(&images, prompts::PHOTO_ANALYSIS_PROMPT)];
        match vision.complete(&messages).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                tracing::warn!("{} returned no content, using default description", vision.name());
                prompts::IMAGE_FEATURES_FALLBACK.to_string()
            }
            Err(e) => {
                tracing::warn!("Photo analysis failed, using default description: {}", e);
                prompts::IMAGE_FEATURES_FALLBACK.to_string()
            }
        }
    };

    Ok(Json(AnalyzeResponse { image_features }))
}

pub async fn analyze_layout(
    State(state): State<AppState>,
    AppJson(request): AppJson<LayoutRequest>,
) -> Result<Json<LayoutResponse>> {
    let user_id = require_user(request.user_id)?;
    let image_url = request
        .image_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Floor plan image is required".to_string()))?;

    if !state.ai.gemini.is_configured() {
        return Err(AppError::NotConfigured("Gemini model"));
    }

    let style = prompts::resolve_style(request.style.as_deref());
    let scene = prompts::resolve_scene(request.scene.as_deref());

    let receipt = state
        .ledger
        .charge(
            user_id,
            state.config.pricing.layout_cost,
            &format!("户型软装分析 - {}", style.name),
        )
        .await?;

    let analysis = analyze_floor_plan(&state, &image_url, &style).await;
    let plan = refund_on_error(&state, &receipt, analysis).await?;
    let story_script = write_story(&state, &plan.analysis, &style, &scene).await;

    tracing::info!(
        "Floor plan analyzed for user {}: {} rooms, style {}",
        user_id,
        plan.rooms.len(),
        style.key
    );

    Ok(Json(LayoutResponse {
        analysis: plan.analysis,
        room_suggestions: plan.rooms,
        story_script,
        style_name: style.name.to_string(),
        style_en: style.english.to_string(),
        scene_name: scene.persona.to_string(),
        new_points: receipt.balance_after,
    }))
}

async fn analyze_floor_plan(state: &AppState, image_url: &str, style: &Style) -> Result<FloorPlan> {
    let image = fetch_inline_image(&state.ai.http, image_url).await?;
    let text = state
        .ai
        .gemini
        .generate_text(&prompts::room_suggestions_prompt(style), &image)
        .await?;

    match parse_floor_plan(&text) {
        FloorPlanParse::Parsed(plan) => Ok(plan),
        FloorPlanParse::ParseError { raw, reason } => {
            let preview: String = raw.chars().take(300).collect();
            tracing::warn!("Floor plan response is not valid JSON ({}): {}", reason, preview);
            Err(AppError::Parse(format!("floor plan analysis: {}", reason)))
        }
    }
}

/// Life-scene story for the chosen persona; empty when the chat model is
/// unavailable.
async fn write_story(state: &AppState, analysis: &str, style: &Style, scene: &Scene) -> String {
    let chat = &state.ai.chat;
    if !chat.is_configured() {
        tracing::warn!("{} is not configured, skipping story", chat.name());
        return String::new();
    }

    let messages = [
        ChatMessage::system(prompts::STORYTELLER_SYSTEM_PROMPT),
        ChatMessage::user(prompts::story_prompt(analysis, style, scene)),
    ];

    match chat.complete(&messages).await {
        Ok(text) => strip_markdown(&text),
        Err(e) => {
            tracing::warn!("Story generation failed: {}", e);
            String::new()
        }
    }
}
