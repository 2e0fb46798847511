use serde::{Deserialize, Serialize};

use crate::models::analysis::AnalysisResult;

/// One persisted analysis. Created by the history service at save time and
/// never mutated afterwards; removal happens only en masse via clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// Timestamp-derived identifier, unique per save (appends are serialized).
    pub id: String,
    pub job_title: String,
    /// Display-formatted save timestamp.
    pub date: String,
    pub result: AnalysisResult,
}
