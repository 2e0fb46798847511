//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::orchestrator::run_batch;
use crate::errors::AppError;
use crate::models::analysis::{JobRole, TaggedAnalysis};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub job_roles: Vec<JobRole>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub results: Vec<TaggedAnalysis>,
    pub active_index: usize,
}

/// POST /api/v1/analysis
///
/// Runs one analysis batch: one concurrent model call per valid job role,
/// all-or-nothing. Successful results are persisted to history and returned
/// in the submitted role order.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let outcome = run_batch(
        state.analysis_model.as_ref(),
        &state.history,
        &request.resume_text,
        &request.job_roles,
    )
    .await?;

    Ok(Json(AnalyzeResponse {
        results: outcome.results,
        active_index: outcome.active_index,
    }))
}
