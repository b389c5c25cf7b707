use axum::{extract::State, response::Json};

use crate::{
    auth::{JwtService, PasswordService},
    errors::{AppError, Result},
    handlers::AppState,
    middleware::AppJson,
    models::{AuthResponse, LoginRequest, NewUser, RegisterRequest, User, UserResponse},
};

fn auth_response(state: &AppState, user: User) -> Result<Json<AuthResponse>> {
    let jwt_service = JwtService::new(&state.config.jwt_secret);
    let access_token = jwt_service.generate_access_token(user.id, &user.email, user.is_admin)?;

    Ok(Json(AuthResponse {
        success: true,
        user: UserResponse::from(user),
        access_token,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let email = request.email.trim().to_lowercase();
    PasswordService::validate_credentials(&email, &request.password)?;

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let username = request
        .username
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| PasswordService::default_username(&email));

    let new_user = NewUser {
        password_hash: PasswordService::hash_password(&request.password)?,
        email,
        username,
    };

    let user = state
        .users
        .create_with_bonus(&new_user, state.config.pricing.registration_bonus)
        .await?;

    tracing::info!("Registered user {} with {} points", user.id, user.points);
    auth_response(&state, user)
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation("Email and password are required".to_string()));
    }

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if !PasswordService::verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::Auth("Incorrect password".to_string()));
    }

    state.users.touch_login(user.id).await?;
    auth_response(&state, user)
}
