use axum::{extract::State, response::Json};
use uuid::Uuid;

use crate::{
    errors::Result,
    handlers::{require_user, AppState},
    middleware::{AppJson, AppPath},
    models::{BalanceResponse, RedeemRequest, RedeemResponse},
};

pub async fn redeem(
    State(state): State<AppState>,
    AppJson(request): AppJson<RedeemRequest>,
) -> Result<Json<RedeemResponse>> {
    let user_id = require_user(request.user_id)?;
    let code = request.code.unwrap_or_default();

    let (points, new_balance) = state.ledger.redeem(user_id, &code).await?;

    Ok(Json(RedeemResponse {
        success: true,
        points,
        new_balance,
    }))
}

pub async fn balance(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<BalanceResponse>> {
    Ok(Json(state.ledger.balance(user_id).await?))
}
