use std::sync::Arc;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use tracing::error;

use crate::chat::session::{ChatMessage, ChatState, Sender, SharedSession};
use crate::errors::AppError;
use crate::llm_client::{ChatModel, LlmError};
use crate::models::analysis::AnalysisResult;

/// Shown in place of an assistant reply that failed before producing any text.
pub const STREAM_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";

/// Incremental events mirrored to the HTTP client while a reply streams.
/// Every `Chunk` has already been appended to the session transcript when
/// it is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Chunk(String),
    Done,
    Failed,
}

/// Submits one question to a session's conversation.
///
/// Rejected without touching the session if a reply is already streaming or
/// the question is blank. Otherwise the user message and an empty assistant
/// placeholder are appended, the session enters `Streaming`, and a spawned
/// task drains the model's fragment stream into the trailing message — so
/// the stream runs to completion even if the HTTP client goes away.
pub async fn submit_question(
    session: SharedSession,
    model: Arc<dyn ChatModel>,
    question: &str,
) -> Result<UnboundedReceiver<StreamEvent>, AppError> {
    let question = question.trim().to_string();
    if question.is_empty() {
        return Err(AppError::Validation("Question cannot be empty".to_string()));
    }

    let context = {
        let mut s = session.lock().await;
        if s.state == ChatState::Streaming {
            return Err(AppError::ChatBusy);
        }
        s.messages.push(ChatMessage::user(question.clone()));
        s.messages.push(ChatMessage::assistant(""));
        s.state = ChatState::Streaming;
        s.context.clone()
    };

    let (tx, rx) = mpsc::unbounded();
    tokio::spawn(drain_reply(session, model, context, question, tx));

    Ok(rx)
}

/// Consumes the model stream for one turn and settles the session back to
/// `Idle` whatever happens.
async fn drain_reply(
    session: SharedSession,
    model: Arc<dyn ChatModel>,
    context: AnalysisResult,
    question: String,
    tx: UnboundedSender<StreamEvent>,
) {
    let outcome = pump_fragments(&session, model.as_ref(), &context, &question, &tx).await;

    let failed = match outcome {
        Ok(()) => false,
        Err(e) => {
            error!("Chat stream failed: {e}");
            let mut s = session.lock().await;
            // A failure with no text yet gets the fixed fallback; partial
            // text is retained as-is.
            if let Some(last) = s.messages.last_mut() {
                if last.sender == Sender::Assistant && last.text.is_empty() {
                    last.text = STREAM_FALLBACK.to_string();
                    let _ = tx.unbounded_send(StreamEvent::Chunk(STREAM_FALLBACK.to_string()));
                }
            }
            true
        }
    };

    session.lock().await.state = ChatState::Idle;

    let _ = tx.unbounded_send(if failed {
        StreamEvent::Failed
    } else {
        StreamEvent::Done
    });
}

/// Appends each received fragment to the trailing assistant message, in
/// arrival order, emitting a mirror event after every append.
async fn pump_fragments(
    session: &SharedSession,
    model: &dyn ChatModel,
    context: &AnalysisResult,
    question: &str,
    tx: &UnboundedSender<StreamEvent>,
) -> Result<(), LlmError> {
    let mut fragments = model.stream_reply(context, question).await?;

    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        {
            let mut s = session.lock().await;
            if let Some(last) = s.messages.last_mut() {
                if last.sender == Sender::Assistant {
                    last.text.push_str(&fragment);
                }
            }
        }
        let _ = tx.unbounded_send(StreamEvent::Chunk(fragment));
    }

    Ok(())
}
