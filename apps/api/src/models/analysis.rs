use serde::{Deserialize, Serialize};

/// Coarse three-level relevance classification accompanying the numeric score.
/// Decoding rejects anything outside these three strings, so a malformed
/// model response fails the whole call instead of half-parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    High,
    Medium,
    Low,
}

/// Skills the model found in the job description but not the resume,
/// split by how hard a requirement they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingSkills {
    pub must_have: Vec<String>,
    pub nice_to_have: Vec<String>,
}

/// One resume-vs-job-description analysis, exactly as the model returns it.
/// Immutable once produced; persisted verbatim inside an `AnalysisRecord`.
///
/// `alternative_roles` is populated by the model only when the score is
/// below 50 — that policy lives in the prompt, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub relevance_score: u8,
    pub verdict: Verdict,
    pub summary: String,
    pub missing_skills: MissingSkills,
    pub improvement_suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_roles: Option<Vec<String>>,
}

/// A job role submitted for analysis. Roles with a blank title or
/// description are silently excluded from the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRole {
    pub title: String,
    pub description: String,
}

/// An `AnalysisResult` tagged with the title of the role it was run against.
/// Wire shape matches the untagged result with an extra `jobTitle` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedAnalysis {
    pub job_title: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
}
