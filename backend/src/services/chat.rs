//! Conversational streaming sessions
//!
//! A session binds a persona and a language at creation and owns its
//! transcript. A send appends the user entry and one assistant entry, then
//! grows that assistant entry fragment by fragment until the reply ends.
//! Callers only ever see cloned snapshots.
//!
//! Once a send starts, the reply runs to completion on its own task even if
//! the caller stops listening; there is no mid-stream abort.

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::Serialize;
use shared::{validate_non_empty, ChatMessage, Language, Sender};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::{ChatRequest, GenerativeModel, ModelError, Turn};

/// Shown to the user when a reply fails
pub const CHAT_ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

pub type SessionId = Uuid;

/// Idle lifetime used when the store is built without configuration
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Persona instruction bound to a session's language
pub fn persona_instruction(language: Language) -> String {
    format!(
        "You are AgroGenius, a friendly and knowledgeable AI assistant for farmers. Your goal is to provide helpful, accurate, and concise information about agriculture. Answer questions about crops, soil health, pest control, farming techniques, and market trends. Your responses should be in the user's language, which is: {}.",
        language.code()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    AwaitingReply,
}

/// Events delivered while a reply streams
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A new fragment and the assistant message accumulated so far
    Fragment { delta: String, text: String },
    /// The reply finished; `message` is the final assistant entry
    Completed { message: ChatMessage },
    /// The reply failed; `message` carries partial text plus the error text
    Failed { message: ChatMessage },
}

impl ChatEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::Fragment { .. } => "fragment",
            ChatEvent::Completed { .. } => "completed",
            ChatEvent::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChatEvent::Fragment { .. })
    }
}

/// Read-only view of a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub language: Language,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub transcript: Vec<ChatMessage>,
}

#[derive(Debug)]
pub struct ChatSession {
    id: SessionId,
    language: Language,
    system_instruction: String,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
    transcript: Vec<ChatMessage>,
    // Completed turns only; this is what the model sees as context
    history: Vec<Turn>,
    pending_user_text: Option<String>,
}

impl ChatSession {
    pub fn new(language: Language) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            language,
            system_instruction: persona_instruction(language),
            created_at: now,
            last_active: now,
            transcript: Vec::new(),
            history: Vec::new(),
            pending_user_text: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn state(&self) -> SessionState {
        if self.pending_user_text.is_some() {
            SessionState::AwaitingReply
        } else {
            SessionState::Idle
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// Idle and untouched since before `cutoff`
    fn is_expired(&self, cutoff: DateTime<Utc>) -> bool {
        self.state() == SessionState::Idle && self.last_active < cutoff
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            language: self.language,
            state: self.state(),
            created_at: self.created_at,
            transcript: self.transcript.clone(),
        }
    }

    /// Idle -> AwaitingReply. Appends the user entry and an empty assistant
    /// entry and returns the request carrying the full context.
    pub fn begin_turn(&mut self, text: &str) -> AppResult<ChatRequest> {
        if self.state() == SessionState::AwaitingReply {
            return Err(AppError::SessionBusy(self.id));
        }
        validate_non_empty("message", text)?;

        self.transcript.push(ChatMessage::user(text));
        self.transcript.push(ChatMessage::assistant(""));
        self.pending_user_text = Some(text.to_string());
        self.touch();

        let mut contents = self.history.clone();
        contents.push(Turn::user(text));
        Ok(ChatRequest {
            system_instruction: self.system_instruction.clone(),
            contents,
        })
    }

    /// Grow the in-flight assistant entry and return its text so far
    pub fn append_fragment(&mut self, delta: &str) -> String {
        match self.pending_reply_mut() {
            Some(reply) => {
                reply.text.push_str(delta);
                reply.text.clone()
            }
            None => String::new(),
        }
    }

    /// AwaitingReply -> Idle after the stream ended normally
    pub fn complete_turn(&mut self) -> ChatMessage {
        let reply = self.finalize_reply();
        self.touch();
        if let Some(user_text) = self.pending_user_text.take() {
            self.history.push(Turn::user(user_text));
            self.history.push(Turn::model(reply.text.clone()));
        }
        reply
    }

    /// AwaitingReply -> Idle after a failure. Partial text is kept and the
    /// error text follows it; the failed turn is not added to model context.
    pub fn fail_turn(&mut self) -> ChatMessage {
        if let Some(reply) = self.pending_reply_mut() {
            if reply.text.trim().is_empty() {
                reply.text = CHAT_ERROR_MESSAGE.to_string();
            } else {
                reply.text.push_str("\n\n");
                reply.text.push_str(CHAT_ERROR_MESSAGE);
            }
        }
        let reply = self.finalize_reply();
        self.touch();
        self.pending_user_text = None;
        reply
    }

    fn pending_reply_mut(&mut self) -> Option<&mut ChatMessage> {
        if self.pending_user_text.is_none() {
            return None;
        }
        self.transcript
            .last_mut()
            .filter(|m| m.sender == Sender::Assistant)
    }

    fn finalize_reply(&mut self) -> ChatMessage {
        match self.pending_reply_mut() {
            Some(reply) => {
                reply.sent_at = Utc::now();
                reply.clone()
            }
            None => ChatMessage::assistant(""),
        }
    }
}

/// In-memory sessions. Idle sessions past their time to live are evicted.
#[derive(Clone)]
pub struct ChatSessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<Mutex<ChatSession>>>>>,
    ttl: Duration,
}

impl Default for ChatSessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl ChatSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Always issues a fresh session
    pub async fn open(&self, language: Language) -> SessionSnapshot {
        self.evict_expired(Utc::now()).await;
        let session = ChatSession::new(language);
        let snapshot = session.snapshot();
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::new(Mutex::new(session)));
        tracing::info!(session = %snapshot.id, %language, "Chat session opened");
        snapshot
    }

    /// Keep `current` if it is bound to `language`, otherwise discard it and
    /// open a new session. Sessions are never re-bound in place.
    pub async fn rebind(&self, current: Option<SessionId>, language: Language) -> SessionSnapshot {
        if let Some(id) = current {
            if let Some(session) = self.get(id).await {
                let mut guard = session.lock().await;
                if guard.language() == language {
                    guard.touch();
                    return guard.snapshot();
                }
            }
            self.discard(id).await;
        }
        self.open(language).await
    }

    pub async fn get(&self, id: SessionId) -> Option<Arc<Mutex<ChatSession>>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn snapshot(&self, id: SessionId) -> Option<SessionSnapshot> {
        let session = self.get(id).await?;
        let guard = session.lock().await;
        Some(guard.snapshot())
    }

    pub async fn discard(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(session = %id, "Chat session discarded");
        }
        removed
    }

    /// Drop idle sessions whose last activity is older than the time to
    /// live as of `now`. Sessions awaiting a reply, or locked by a running
    /// turn, are kept. Returns how many were dropped.
    pub async fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let cutoff = match chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_sub_signed(ttl))
        {
            Some(cutoff) => cutoff,
            None => return 0,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(guard) => !guard.is_expired(cutoff),
            Err(_) => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Evicted idle chat sessions");
        }
        evicted
    }

    /// Run `evict_expired` every `every` on a background task
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let every = every.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                store.evict_expired(Utc::now()).await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Sends chat messages and streams replies
#[derive(Clone)]
pub struct ChatService {
    model: Arc<dyn GenerativeModel>,
    store: ChatSessionStore,
}

impl ChatService {
    pub fn new(model: Arc<dyn GenerativeModel>, store: ChatSessionStore) -> Self {
        Self { model, store }
    }

    pub async fn open_chat_session(&self, language: Language) -> SessionSnapshot {
        self.store.open(language).await
    }

    /// Send a user message. The returned stream yields fragment events and
    /// ends with exactly one completed or failed event.
    pub async fn send_chat_message(
        &self,
        id: SessionId,
        text: &str,
    ) -> AppResult<impl Stream<Item = ChatEvent> + Send + 'static> {
        let session = self
            .store
            .get(id)
            .await
            .ok_or(AppError::SessionNotFound(id))?;

        let request = session.lock().await.begin_turn(text)?;

        let (tx, mut rx) = mpsc::channel(32);
        tokio::spawn(run_turn(self.model.clone(), session, request, tx));

        Ok(async_stream::stream! {
            while let Some(event) = rx.recv().await {
                yield event;
            }
        })
    }
}

async fn run_turn(
    model: Arc<dyn GenerativeModel>,
    session: Arc<Mutex<ChatSession>>,
    request: ChatRequest,
    tx: mpsc::Sender<ChatEvent>,
) {
    let failure = match model.stream_chat(&request).await {
        Ok(mut fragments) => {
            let mut failure: Option<ModelError> = None;
            while let Some(item) = fragments.next().await {
                match item {
                    Ok(delta) if delta.is_empty() => {}
                    Ok(delta) => {
                        let text = session.lock().await.append_fragment(&delta);
                        // A closed receiver only means nobody is listening
                        let _ = tx.send(ChatEvent::Fragment { delta, text }).await;
                    }
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
            failure
        }
        Err(e) => Some(e),
    };

    let event = match failure {
        None => ChatEvent::Completed {
            message: session.lock().await.complete_turn(),
        },
        Some(e) => {
            tracing::warn!(error = %e, "Chat reply failed");
            ChatEvent::Failed {
                message: session.lock().await.fail_turn(),
            }
        }
    };
    let _ = tx.send(event).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_lifecycle_builds_one_entry_per_side() {
        let mut session = ChatSession::new(Language::Spanish);
        assert_eq!(session.state(), SessionState::Idle);

        let request = session.begin_turn("¿Cuándo siembro maíz?").unwrap();
        assert_eq!(session.state(), SessionState::AwaitingReply);
        assert_eq!(request.contents, vec![Turn::user("¿Cuándo siembro maíz?")]);
        assert!(request.system_instruction.ends_with("which is: es."));

        assert_eq!(session.append_fragment("En "), "En ");
        assert_eq!(session.append_fragment("primavera."), "En primavera.");
        let reply = session.complete_turn();

        assert_eq!(reply.text, "En primavera.");
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript()[0].sender, Sender::User);
        assert_eq!(session.transcript()[1], reply);
    }

    #[test]
    fn test_second_turn_carries_prior_context() {
        let mut session = ChatSession::new(Language::English);
        session.begin_turn("What is NPK?").unwrap();
        session.append_fragment("Nitrogen, phosphorus, potassium.");
        session.complete_turn();

        let request = session.begin_turn("Which matters most for rice?").unwrap();
        assert_eq!(
            request.contents,
            vec![
                Turn::user("What is NPK?"),
                Turn::model("Nitrogen, phosphorus, potassium."),
                Turn::user("Which matters most for rice?"),
            ]
        );
    }

    #[test]
    fn test_send_while_awaiting_reply_is_refused() {
        let mut session = ChatSession::new(Language::English);
        session.begin_turn("first").unwrap();
        assert!(matches!(
            session.begin_turn("second"),
            Err(AppError::SessionBusy(_))
        ));
        assert_eq!(session.transcript().len(), 2);
    }

    #[test]
    fn test_failure_keeps_partial_text_and_skips_history() {
        let mut session = ChatSession::new(Language::English);
        session.begin_turn("Tell me about jute").unwrap();
        session.append_fragment("Jute grows in");
        let reply = session.fail_turn();

        assert_eq!(reply.text, format!("Jute grows in\n\n{}", CHAT_ERROR_MESSAGE));
        assert_eq!(session.state(), SessionState::Idle);

        let request = session.begin_turn("Try again").unwrap();
        assert_eq!(request.contents, vec![Turn::user("Try again")]);
    }

    #[test]
    fn test_failure_without_text_substitutes_error_message() {
        let mut session = ChatSession::new(Language::English);
        session.begin_turn("Hello").unwrap();
        assert_eq!(session.fail_turn().text, CHAT_ERROR_MESSAGE);
    }

    #[test]
    fn test_blank_message_rejected_without_touching_transcript() {
        let mut session = ChatSession::new(Language::English);
        assert!(matches!(
            session.begin_turn("   "),
            Err(AppError::InvalidInput(_))
        ));
        assert!(session.transcript().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_rebind_keeps_same_language_session() {
        let store = ChatSessionStore::new();
        let first = store.open(Language::Hindi).await;
        let same = store.rebind(Some(first.id), Language::Hindi).await;
        assert_eq!(same.id, first.id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire_after_ttl() {
        let store = ChatSessionStore::with_ttl(Duration::from_secs(600));
        for _ in 0..5 {
            store.open(Language::English).await;
        }

        assert_eq!(store.evict_expired(Utc::now()).await, 0);
        assert_eq!(store.len().await, 5);

        let later = Utc::now() + chrono::Duration::seconds(601);
        assert_eq!(store.evict_expired(later).await, 5);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_session_awaiting_reply_is_never_evicted() {
        let store = ChatSessionStore::with_ttl(Duration::from_secs(60));
        let busy = store.open(Language::Hindi).await;
        let idle = store.open(Language::Hindi).await;
        if let Some(session) = store.get(busy.id).await {
            session.lock().await.begin_turn("Kab barish hogi?").unwrap();
        }

        let later = Utc::now() + chrono::Duration::hours(2);
        assert_eq!(store.evict_expired(later).await, 1);
        assert!(store.get(busy.id).await.is_some());
        assert!(store.get(idle.id).await.is_none());
    }

    #[tokio::test]
    async fn test_open_sweeps_expired_sessions() {
        let store = ChatSessionStore::with_ttl(Duration::ZERO);
        let first = store.open(Language::English).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        let second = store.open(Language::English).await;

        assert!(store.get(first.id).await.is_none());
        assert!(store.get(second.id).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn test_activity_refreshes_last_active() {
        let mut session = ChatSession::new(Language::English);
        let opened = session.last_active();
        std::thread::sleep(std::time::Duration::from_millis(5));
        session.begin_turn("Hello").unwrap();
        assert!(session.last_active() > opened);
    }
}
