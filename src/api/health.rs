use crate::api::AppState;
use axum::extract::State;
use axum::Json;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "bot_active": state.controller.is_active().await,
    }))
}
