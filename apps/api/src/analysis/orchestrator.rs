use futures::future;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::history::HistoryService;
use crate::llm_client::AnalysisModel;
use crate::models::analysis::{JobRole, TaggedAnalysis};

/// Output of a successful batch: tagged results in input role order, with
/// the display index defaulted to the first result.
#[derive(Debug)]
pub struct BatchOutcome {
    pub results: Vec<TaggedAnalysis>,
    pub active_index: usize,
}

/// Roles that actually enter the batch: both title and description non-blank.
/// Others are silently excluded.
fn valid_roles(roles: &[JobRole]) -> Vec<&JobRole> {
    roles
        .iter()
        .filter(|r| !r.title.trim().is_empty() && !r.description.trim().is_empty())
        .collect()
}

/// Runs one analysis batch: one concurrent model call per valid role, joined
/// all-or-nothing. If any call fails, the whole batch fails and nothing is
/// persisted — partial success is deliberately not supported.
pub async fn run_batch(
    model: &dyn AnalysisModel,
    history: &HistoryService,
    resume_text: &str,
    roles: &[JobRole],
) -> Result<BatchOutcome, AppError> {
    let valid = valid_roles(roles);
    if resume_text.trim().is_empty() || valid.is_empty() {
        return Err(AppError::Validation(
            "Please provide a resume and fill out the title and description for at least one job role."
                .to_string(),
        ));
    }

    info!("Running analysis batch for {} role(s)", valid.len());

    // Fan out concurrently; try_join_all preserves submission order in the
    // output regardless of completion order.
    let calls = valid.iter().map(|role| async move {
        let result = model.analyze(&role.description, resume_text).await?;
        Ok::<_, AppError>(TaggedAnalysis {
            job_title: role.title.clone(),
            result,
        })
    });

    let results = future::try_join_all(calls).await?;

    // Persistence is fire-and-forget: a failed write is logged, not surfaced.
    for tagged in &results {
        if let Err(e) = history.append(&tagged.job_title, &tagged.result).await {
            warn!("Failed to persist analysis for '{}': {e}", tagged.job_title);
        }
    }

    Ok(BatchOutcome {
        results,
        active_index: 0,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::history::InMemoryKvStore;
    use crate::llm_client::LlmError;
    use crate::models::analysis::{AnalysisResult, MissingSkills, Verdict};

    fn sample_result(score: u8) -> AnalysisResult {
        AnalysisResult {
            relevance_score: score,
            verdict: Verdict::High,
            summary: "Strong backend match with minor gaps.".to_string(),
            missing_skills: MissingSkills {
                must_have: vec![],
                nice_to_have: vec!["GraphQL".to_string()],
            },
            improvement_suggestions: vec!["Mention SQL depth".to_string()],
            alternative_roles: None,
        }
    }

    /// Scripted model: counts calls, fails for one configured description.
    struct ScriptedModel {
        calls: AtomicUsize,
        fail_on_description: Option<&'static str>,
    }

    impl ScriptedModel {
        fn succeeding() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on_description: None,
            }
        }

        fn failing_on(description: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on_description: Some(description),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnalysisModel for ScriptedModel {
        async fn analyze(
            &self,
            job_description: &str,
            _resume_text: &str,
        ) -> Result<AnalysisResult, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on_description == Some(job_description) {
                return Err(LlmError::EmptyContent);
            }
            Ok(sample_result(82))
        }
    }

    fn history() -> HistoryService {
        HistoryService::new(Arc::new(InMemoryKvStore::default()))
    }

    fn role(title: &str, description: &str) -> JobRole {
        JobRole {
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_blank_resume_is_rejected_without_model_calls() {
        let model = ScriptedModel::succeeding();
        let history = history();
        let roles = vec![role("A", "x")];

        let outcome = run_batch(&model, &history, "   ", &roles).await;

        assert!(matches!(outcome, Err(AppError::Validation(_))));
        assert_eq!(model.call_count(), 0);
        assert!(history.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_no_valid_roles_is_rejected_without_model_calls() {
        let model = ScriptedModel::succeeding();
        let history = history();
        let roles = vec![role("", "x"), role("B", "  ")];

        let outcome = run_batch(&model, &history, "resume", &roles).await;

        assert!(matches!(outcome, Err(AppError::Validation(_))));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_roles_are_excluded_from_the_batch() {
        let model = ScriptedModel::succeeding();
        let history = history();
        let roles = vec![role("A", "x"), role("", "y")];

        let outcome = run_batch(&model, &history, "resume", &roles).await.unwrap();

        assert_eq!(model.call_count(), 1);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].job_title, "A");
    }

    #[tokio::test]
    async fn test_one_failed_call_fails_the_whole_batch_and_persists_nothing() {
        let model = ScriptedModel::failing_on("second jd");
        let history = history();
        let roles = vec![
            role("A", "first jd"),
            role("B", "second jd"),
            role("C", "third jd"),
        ];

        let outcome = run_batch(&model, &history, "resume", &roles).await;

        assert!(matches!(outcome, Err(AppError::Llm(_))));
        assert!(history.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_successful_batch_preserves_role_order_and_persists_all() {
        let model = ScriptedModel::succeeding();
        let history = history();
        let roles = vec![role("A", "first jd"), role("B", "second jd")];

        let outcome = run_batch(&model, &history, "resume", &roles).await.unwrap();

        assert_eq!(outcome.active_index, 0);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].job_title, "A");
        assert_eq!(outcome.results[1].job_title, "B");

        // Persisted in input order; history reads back newest first.
        let records = history.load_all().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].job_title, "B");
        assert_eq!(records[1].job_title, "A");
    }

    #[tokio::test]
    async fn test_single_role_scenario_tags_and_persists_the_result() {
        let model = ScriptedModel::succeeding();
        let history = history();
        let roles = vec![role("Backend Engineer", "Node.js, SQL")];

        let outcome = run_batch(&model, &history, "resume text", &roles).await.unwrap();

        assert_eq!(outcome.results[0].job_title, "Backend Engineer");
        assert_eq!(outcome.results[0].result.relevance_score, 82);
        assert_eq!(outcome.results[0].result.verdict, Verdict::High);

        let records = history.load_all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].job_title, "Backend Engineer");
        assert_eq!(records[0].result.relevance_score, 82);
    }
}
