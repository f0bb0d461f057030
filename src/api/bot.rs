//! Bot control endpoints: start, stop, status and position removal.

use crate::api::AppState;
use crate::domain::StatusView;
use crate::error::AppError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// All fields are optional so a missing one yields our own 400 instead of a rejection.
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub token_address: Option<String>,
    pub buy_amount: Option<f64>,
    pub take_profit_percent: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub success: bool,
    pub message: String,
    pub tx_signature: String,
    pub tokens_received: f64,
    pub entry_price_usd: f64,
}

pub async fn start(
    State(state): State<AppState>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<StartResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let (Some(token_address), Some(buy_amount), Some(take_profit_percent)) =
        (req.token_address, req.buy_amount, req.take_profit_percent)
    else {
        return Err(AppError::BadRequest("Missing required fields".into()));
    };

    if !(buy_amount.is_finite() && buy_amount > 0.0) {
        return Err(AppError::BadRequest("Buy amount must be positive".into()));
    }
    if !(take_profit_percent.is_finite() && take_profit_percent > 0.0) {
        return Err(AppError::BadRequest("Take profit must be positive".into()));
    }
    let mint = Pubkey::from_str(token_address.trim())
        .map_err(|_| AppError::BadRequest("Invalid token address".into()))?;

    let receipt = state
        .controller
        .start(mint, buy_amount, take_profit_percent)
        .await?;

    Ok(Json(StartResponse {
        success: true,
        message: "Sniper bot started successfully!".to_string(),
        tx_signature: receipt.tx_signature,
        tokens_received: receipt.tokens_received,
        entry_price_usd: receipt.entry_price_usd,
    }))
}

pub async fn stop(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.controller.stop().await;
    Json(json!({
        "success": true,
        "message": "Bot stopped successfully",
    }))
}

pub async fn status(State(state): State<AppState>) -> Json<StatusView> {
    Json(state.controller.status().await)
}

pub async fn clear_position(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.controller.clear_position().await?;
    Ok(Json(json!({
        "success": true,
        "message": "Position cleared",
    })))
}
