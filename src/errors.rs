use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient points: {required} required, {available} available")]
    InsufficientPoints { required: i32, available: i32 },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Redemption code has already been used")]
    CodeAlreadyUsed,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Upstream AI error: {0}")]
    Upstream(String),

    #[error("AI response could not be parsed: {0}")]
    Parse(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable identifier sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) | AppError::Migration(_) => "database_error",
            AppError::Json(_) | AppError::Internal(_) => "internal_error",
            AppError::Auth(_) => "auth_error",
            AppError::Validation(_) => "validation_error",
            AppError::InsufficientPoints { .. } => "insufficient_points",
            AppError::NotFound(_) => "not_found",
            AppError::CodeAlreadyUsed => "code_already_used",
            AppError::Conflict(_) => "conflict",
            AppError::Forbidden => "forbidden",
            AppError::Upstream(_) => "upstream_error",
            AppError::Parse(_) => "parse_error",
            AppError::NotConfigured(_) => "not_configured",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientPoints { .. } | AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CodeAlreadyUsed | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) | AppError::Parse(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Json(_)
            | AppError::NotConfigured(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                "Database error".to_string()
            }
            AppError::Migration(ref e) => {
                tracing::error!("Migration error: {}", e);
                "Database error".to_string()
            }
            AppError::Json(ref e) => {
                tracing::error!("Serialization error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Upstream(ref msg) | AppError::Parse(ref msg) => {
                tracing::warn!("AI provider failure: {}", msg);
                self.to_string()
            }
            AppError::NotConfigured(name) => {
                tracing::error!("{} is not configured", name);
                self.to_string()
            }
            AppError::Auth(ref msg) | AppError::Validation(ref msg) | AppError::Conflict(ref msg) => {
                msg.clone()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
