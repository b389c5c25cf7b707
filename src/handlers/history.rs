use axum::{extract::State, response::Json};
use serde_json::json;

use crate::{
    errors::{AppError, Result},
    handlers::{require_user, AppState},
    middleware::{AppJson, AppQuery},
    models::{HistoryQuery, HistoryResponse, NewHistoryRecord, SaveHistoryRequest},
};

pub async fn list_history(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let user_id = query
        .user_id
        .ok_or_else(|| AppError::Validation("userId is required".to_string()))?;

    let history = state.history.recent(user_id).await?;
    Ok(Json(HistoryResponse { history }))
}

pub async fn save_history(
    State(state): State<AppState>,
    AppJson(request): AppJson<SaveHistoryRequest>,
) -> Result<Json<serde_json::Value>> {
    let user_id = require_user(request.user_id)?;
    let kind = request
        .kind
        .ok_or_else(|| AppError::Validation("History type is required".to_string()))?;

    let record = NewHistoryRecord {
        user_id,
        kind,
        input_images: request.input_images,
        property_info: request.property_info,
        listing_result: request.listing_result,
        style_name: request.style_name,
        scene_name: request.scene_name,
        layout_result: request.layout_result,
        birdview_image: request.birdview_image,
    };

    let saved = state.history.record(&record).await?;

    Ok(Json(json!({
        "success": true,
        "id": saved.id
    })))
}
