//! Axum route handlers for the Chat API.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::channel::{submit_question, StreamEvent};
use crate::chat::session::ChatMessage;
use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub result: AnalysisResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub messages: Vec<ChatMessage>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// POST /api/v1/chat/sessions
///
/// Opens a conversation anchored to a completed analysis. The transcript
/// starts with the assistant greeting and the starter suggestions.
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Json<SessionResponse> {
    let (id, session) = state.sessions.create(request.result).await;
    let s = session.lock().await;
    Json(SessionResponse {
        session_id: id,
        messages: s.messages.clone(),
        suggestions: s.suggestions(),
    })
}

/// GET /api/v1/chat/sessions/:id
///
/// Returns the current transcript. While a reply is streaming, the trailing
/// assistant message holds the partial text received so far.
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Chat session {id} not found")))?;

    let s = session.lock().await;
    Ok(Json(SessionResponse {
        session_id: id,
        messages: s.messages.clone(),
        suggestions: s.suggestions(),
    }))
}

/// POST /api/v1/chat/sessions/:id/messages
///
/// Submits one question and streams the assistant reply back as SSE
/// `chunk` events, terminated by a `done` or `error` event. Returns 409
/// without touching the session if a reply is already in flight.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Chat session {id} not found")))?;

    let events = submit_question(session, state.chat_model.clone(), &request.text).await?;

    let sse = events.map(|event| {
        Ok::<_, Infallible>(match event {
            StreamEvent::Chunk(text) => Event::default().event("chunk").data(text),
            StreamEvent::Done => Event::default().event("done").data(""),
            StreamEvent::Failed => Event::default().event("error").data(""),
        })
    });

    Ok(Sse::new(sse).keep_alive(KeepAlive::default()))
}
