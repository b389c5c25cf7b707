pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use handlers::AppState;

pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/points/redeem", post(handlers::points::redeem))
        .route("/points/:user_id", get(handlers::points::balance))
        .route("/analyze", post(handlers::analyze::analyze_photos))
        .route("/analyze/layout", post(handlers::analyze::analyze_layout))
        .route("/generate/listing", post(handlers::generate::generate_listing))
        .route("/generate/render", post(handlers::generate::generate_render))
        .route(
            "/history",
            get(handlers::history::list_history).post(handlers::history::save_history),
        )
        .route(
            "/admin/codes",
            get(handlers::admin::list_codes).post(handlers::admin::generate_codes),
        )
        .route("/admin/codes/:id", delete(handlers::admin::delete_code));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/health", get(handlers::health::liveness))
        .route("/ready", get(handlers::health::readiness))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(state.config.max_body_bytes)),
        )
        .with_state(state)
}
