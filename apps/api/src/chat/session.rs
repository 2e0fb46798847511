use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;

/// Fixed greeting every conversation opens with.
pub const GREETING: &str = "Hello! I'm your AI assistant. I can help you dig deeper into your analysis results. What would you like to know?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One message in a conversation. Assistant text is mutable while its reply
/// is streaming, frozen once the stream ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }
}

/// Whether a reply is currently streaming. A new question is rejected while
/// the session is `Streaming`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    Streaming,
}

/// One open conversation, anchored to the analysis it is about.
/// While a turn is streaming, the trailing message is always the assistant
/// message being filled in.
pub struct ChatSession {
    pub id: Uuid,
    pub context: AnalysisResult,
    pub messages: Vec<ChatMessage>,
    pub state: ChatState,
}

impl ChatSession {
    pub fn new(context: AnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            context,
            messages: vec![ChatMessage::assistant(GREETING)],
            state: ChatState::Idle,
        }
    }

    /// Starter questions, offered only while the transcript is exactly the
    /// greeting. Gone permanently once any exchange occurs.
    pub fn suggestions(&self) -> Vec<String> {
        if self.messages.len() > 1 {
            return Vec::new();
        }
        vec![
            "Explain the improvement suggestions.".to_string(),
            format!("Why is the relevance score {}?", self.context.relevance_score),
            "What are the most critical missing skills?".to_string(),
        ]
    }
}

pub type SharedSession = Arc<Mutex<ChatSession>>;

/// Registry of open conversations, shared through `AppState`.
/// Sessions live for the life of the process; there is no expiry.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, SharedSession>>>,
}

impl SessionRegistry {
    pub async fn create(&self, context: AnalysisResult) -> (Uuid, SharedSession) {
        let session = ChatSession::new(context);
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));
        self.sessions.lock().await.insert(id, shared.clone());
        (id, shared)
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.lock().await.get(&id).cloned()
    }
}
