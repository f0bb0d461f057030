pub mod bot;
pub mod health;

use crate::orchestration::BotController;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<BotController>,
}

impl AppState {
    pub fn new(controller: Arc<BotController>) -> Self {
        Self { controller }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/start", post(bot::start))
        .route("/api/stop", post(bot::stop))
        .route("/api/status", get(bot::status))
        .route("/api/position", delete(bot::clear_position))
        .layer(cors)
        .with_state(state)
}
