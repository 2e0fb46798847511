//! Axum route handlers for the History API.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::history::AnalysisRecord;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub records: Vec<AnalysisRecord>,
}

/// GET /api/v1/history
///
/// Returns all persisted analyses, newest first. Unreadable or corrupt
/// storage reads as an empty history rather than an error.
pub async fn handle_get_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        records: state.history.load_all().await,
    })
}

/// DELETE /api/v1/history
///
/// Removes every persisted record unconditionally.
pub async fn handle_clear_history(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.history.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}
