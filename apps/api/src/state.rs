use std::sync::Arc;

use crate::chat::session::SessionRegistry;
use crate::history::HistoryService;
use crate::llm_client::{AnalysisModel, ChatModel};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model seams — in production both handles point at the one
    /// `GeminiClient`; tests swap in scripted implementations.
    pub analysis_model: Arc<dyn AnalysisModel>,
    pub chat_model: Arc<dyn ChatModel>,
    pub history: Arc<HistoryService>,
    pub sessions: SessionRegistry,
}
