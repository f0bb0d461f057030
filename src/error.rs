use crate::orchestration::{ClearError, StartError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    /// Bought on-chain but not recorded locally. The signature goes back to the caller.
    #[error("Position not saved after buy {signature}: {message}")]
    Unrecorded { signature: String, message: String },
}

impl From<StartError> for AppError {
    fn from(err: StartError) -> Self {
        match err {
            StartError::NoWallet
            | StartError::AlreadyActive
            | StartError::PriceUnavailable(_)
            | StartError::BuySubmissionFailed(_) => AppError::BadRequest(err.to_string()),
            StartError::PositionNotSaved { ref signature, .. } => AppError::Unrecorded {
                signature: signature.clone(),
                message: err.to_string(),
            },
        }
    }
}

impl From<ClearError> for AppError {
    fn from(err: ClearError) -> Self {
        match err {
            ClearError::Active => AppError::Conflict(err.to_string()),
            ClearError::Store(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
            AppError::Unrecorded { signature, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message, "tx_signature": signature }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
