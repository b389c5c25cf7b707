use std::collections::BTreeMap;

use axum::{extract::State, response::Json};
use futures::future::{join, try_join_all};

use crate::{
    errors::{AppError, Result},
    handlers::{refund_on_error, require_user, AppState},
    middleware::AppJson,
    models::{
        ListingRequest, ListingResponse, Platform, PropertyInfo, RenderRequest, RenderResponse,
    },
    services::{
        ai::ChatMessage,
        parsing::{extract_selling_points, DEFAULT_SELLING_POINTS},
        prompts,
    },
    utils::image::fetch_inline_image,
};

pub async fn generate_listing(
    State(state): State<AppState>,
    AppJson(request): AppJson<ListingRequest>,
) -> Result<Json<ListingResponse>> {
    let user_id = require_user(request.user_id)?;
    let property_info = request
        .property_info
        .ok_or_else(|| AppError::Validation("Property information is required".to_string()))?;

    if !state.ai.chat.is_configured() {
        return Err(AppError::NotConfigured("Chat model"));
    }

    let platforms = property_info.selected_platforms();
    let cost = state.config.pricing.listing_cost_per_platform * platforms.len() as i32;
    let labels: Vec<&str> = platforms.iter().map(Platform::label).collect();

    let receipt = state
        .ledger
        .charge(user_id, cost, &format!("生成房源文案 - {}", labels.join("、")))
        .await?;

    let image_features = request
        .image_features
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| prompts::IMAGE_FEATURES_FALLBACK.to_string());

    let (selling_points, contents) = join(
        selling_points(&state, &property_info, &image_features),
        try_join_all(
            platforms
                .iter()
                .map(|&platform| platform_copy(&state, platform, &property_info, &image_features)),
        ),
    )
    .await;

    let contents: BTreeMap<Platform, String> =
        refund_on_error(&state, &receipt, contents).await?.into_iter().collect();

    tracing::info!(
        "Generated listing copy for user {} on {} platforms",
        user_id,
        contents.len()
    );

    Ok(Json(ListingResponse {
        selling_points,
        contents,
        new_points: receipt.balance_after,
    }))
}

async fn selling_points(state: &AppState, info: &PropertyInfo, image_features: &str) -> Vec<String> {
    let messages = [
        ChatMessage::system(prompts::COPYWRITER_SYSTEM_PROMPT),
        ChatMessage::user(prompts::selling_points_prompt(info, image_features)),
    ];

    match state.ai.chat.complete(&messages).await {
        Ok(text) => extract_selling_points(&text),
        Err(e) => {
            tracing::warn!("Selling point generation failed, using defaults: {}", e);
            DEFAULT_SELLING_POINTS.iter().map(|p| p.to_string()).collect()
        }
    }
}

async fn platform_copy(
    state: &AppState,
    platform: Platform,
    info: &PropertyInfo,
    image_features: &str,
) -> Result<(Platform, String)> {
    let messages = [
        ChatMessage::system(prompts::COPYWRITER_SYSTEM_PROMPT),
        ChatMessage::user(prompts::platform_prompt(platform, info, image_features)),
    ];

    let text = state.ai.chat.complete(&messages).await?;
    if text.is_empty() {
        return Err(AppError::Upstream(format!(
            "Chat model returned no copy for {}",
            platform.label()
        )));
    }
    Ok((platform, text))
}

/// Bird's-eye rendering of an already analyzed floor plan. Paid for by the
/// layout analysis, so no points are charged here.
pub async fn generate_render(
    State(state): State<AppState>,
    AppJson(request): AppJson<RenderRequest>,
) -> Result<Json<RenderResponse>> {
    let user_id = require_user(request.user_id)?;
    let (image_url, style_en) = match (request.image_url, request.style_en) {
        (Some(url), Some(style)) if !url.trim().is_empty() && !style.trim().is_empty() => {
            (url, style)
        }
        _ => {
            return Err(AppError::Validation(
                "imageUrl and styleEn are required".to_string(),
            ))
        }
    };

    if !state.ai.gemini.is_configured() {
        return Err(AppError::NotConfigured("Gemini model"));
    }

    let image = fetch_inline_image(&state.ai.http, &image_url).await?;
    let prompt = prompts::render_prompt(&style_en);

    let gemini = &state.ai.gemini;
    let (prompt, image) = (prompt.as_str(), &image);
    let rendered = state
        .config
        .ai
        .render_retry
        .run("Birdview render", move |attempt| {
            tracing::debug!("Birdview render attempt {} for user {}", attempt, user_id);
            gemini.generate_image(prompt, image)
        })
        .await?;

    state.history.attach_birdview(user_id, &rendered).await;
    tracing::info!("Rendered birdview for user {}", user_id);

    Ok(Json(RenderResponse { image_url: rendered }))
}
