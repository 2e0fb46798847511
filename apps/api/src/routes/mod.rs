pub mod health;
pub mod sample;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis_handlers;
use crate::chat::handlers as chat_handlers;
use crate::history::handlers as history_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis", post(analysis_handlers::handle_analyze))
        .route("/api/v1/resume/sample", get(sample::sample_resume_handler))
        // History API
        .route(
            "/api/v1/history",
            get(history_handlers::handle_get_history)
                .delete(history_handlers::handle_clear_history),
        )
        // Chat API
        .route(
            "/api/v1/chat/sessions",
            post(chat_handlers::handle_create_session),
        )
        .route(
            "/api/v1/chat/sessions/:id",
            get(chat_handlers::handle_get_session),
        )
        .route(
            "/api/v1/chat/sessions/:id/messages",
            post(chat_handlers::handle_send_message),
        )
        .with_state(state)
}
