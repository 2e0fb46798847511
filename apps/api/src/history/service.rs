use std::sync::Arc;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use tokio::sync::Mutex;
use tracing::warn;

use crate::history::store::KvStore;
use crate::models::analysis::AnalysisResult;
use crate::models::history::AnalysisRecord;

/// Namespace key the whole history list is stored under.
pub const HISTORY_KEY: &str = "next_hire_analysis_history";

/// Append-only history of past analyses, newest first.
///
/// Reads fail soft: absent, unreadable, or malformed stored content is an
/// empty history, never an error. Appends are whole-list read-modify-write,
/// serialized by a mutex because the service runs on a multi-threaded host.
pub struct HistoryService {
    store: Arc<dyn KvStore>,
    write_lock: Mutex<()>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns every persisted record, newest first. Never errors.
    pub async fn load_all(&self) -> Vec<AnalysisRecord> {
        let raw = match self.store.get(HISTORY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read analysis history, treating as empty: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<AnalysisRecord>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Stored analysis history is malformed, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Builds a new record for `result`, prepends it, and persists the whole
    /// list. No deduplication, no size cap.
    pub async fn append(&self, job_title: &str, result: &AnalysisResult) -> Result<AnalysisRecord> {
        // Serializes concurrent read-modify-write cycles; the nanosecond
        // timestamp id stays unique because saves never overlap.
        let _guard = self.write_lock.lock().await;

        let mut records = self.load_all().await;

        let now = Utc::now();
        let record = AnalysisRecord {
            id: now.to_rfc3339_opts(SecondsFormat::Nanos, true),
            job_title: job_title.to_string(),
            date: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            result: result.clone(),
        };

        records.insert(0, record.clone());
        self.store
            .set(HISTORY_KEY, &serde_json::to_string(&records)?)
            .await?;

        Ok(record)
    }

    /// Removes all persisted records unconditionally.
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(HISTORY_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::store::InMemoryKvStore;
    use crate::models::analysis::{AnalysisResult, MissingSkills, Verdict};

    fn sample_result(score: u8) -> AnalysisResult {
        AnalysisResult {
            relevance_score: score,
            verdict: Verdict::High,
            summary: "Solid match.".to_string(),
            missing_skills: MissingSkills::default(),
            improvement_suggestions: vec!["Mention SQL depth".to_string()],
            alternative_roles: None,
        }
    }

    fn service() -> (Arc<InMemoryKvStore>, HistoryService) {
        let store = Arc::new(InMemoryKvStore::default());
        let service = HistoryService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_load_all_on_empty_storage_is_empty() {
        let (_, history) = service();
        assert!(history.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_all_on_corrupt_storage_is_empty() {
        let (store, history) = service();
        store.set(HISTORY_KEY, "{not json").await.unwrap();
        assert!(history.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_all_on_non_list_storage_is_empty() {
        let (store, history) = service();
        store
            .set(HISTORY_KEY, r#"{"unexpected":"object"}"#)
            .await
            .unwrap();
        assert!(history.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_append_prepends_newest_first() {
        let (_, history) = service();
        history.append("First Role", &sample_result(60)).await.unwrap();
        history.append("Second Role", &sample_result(82)).await.unwrap();
        history.append("Third Role", &sample_result(40)).await.unwrap();

        let records = history.load_all().await;
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].job_title, "Third Role");
        assert_eq!(records[1].job_title, "Second Role");
        assert_eq!(records[2].job_title, "First Role");
        assert_eq!(records[1].result.relevance_score, 82);
    }

    #[tokio::test]
    async fn test_append_ids_are_unique() {
        let (_, history) = service();
        let a = history.append("Role", &sample_result(50)).await.unwrap();
        let b = history.append("Role", &sample_result(50)).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_clear_then_load_all_is_empty() {
        let (_, history) = service();
        history.append("Role", &sample_result(70)).await.unwrap();
        history.clear().await.unwrap();
        assert!(history.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_on_empty_history_is_ok() {
        let (_, history) = service();
        history.clear().await.unwrap();
        assert!(history.load_all().await.is_empty());
    }
}
