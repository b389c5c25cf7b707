use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::RedemptionCodeService,
    errors::{AppError, Result},
    handlers::AppState,
    middleware::{AdminUser, AppJson, AppPath, AppQuery},
    models::{CodeListQuery, CodeListResponse, CodeStats, GenerateCodesRequest},
};

pub const MAX_CODES_PER_BATCH: u32 = 100;

pub async fn generate_codes(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(request): AppJson<GenerateCodesRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    if request.count == 0 || request.count > MAX_CODES_PER_BATCH {
        return Err(AppError::Validation(format!(
            "count must be between 1 and {}",
            MAX_CODES_PER_BATCH
        )));
    }
    if request.points <= 0 {
        return Err(AppError::Validation("points must be positive".to_string()));
    }

    let codes = RedemptionCodeService::generate_codes(request.count as usize);
    let created = state.codes.insert_codes(&codes, request.points).await?;

    tracing::info!(
        "Admin {} generated {} codes worth {} points",
        admin.email,
        created.len(),
        request.points
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "codes": created
        })),
    ))
}

pub async fn list_codes(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppQuery(query): AppQuery<CodeListQuery>,
) -> Result<Json<CodeListResponse>> {
    let codes = state.codes.list_codes(query.status).await?;
    let stats = CodeStats::from_codes(&codes);

    Ok(Json(CodeListResponse { codes, stats }))
}

pub async fn delete_code(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(code_id): AppPath<Uuid>,
) -> Result<Json<serde_json::Value>> {
    if !state.codes.delete_code(code_id).await? {
        return Err(AppError::NotFound("Redemption code"));
    }

    tracing::info!("Admin {} deleted redemption code {}", admin.email, code_id);

    Ok(Json(json!({
        "success": true
    })))
}
