//! HTTP handlers for chat sessions

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use shared::Language;
use std::convert::Infallible;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::chat::CHAT_ERROR_MESSAGE;
use crate::services::{ChatEvent, ChatService, SessionSnapshot};
use crate::AppState;

/// Open a session, or rebind the caller's previous one
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    pub language: Language,
    pub previous_session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 4000))]
    pub text: String,
}

/// Open a chat session bound to a language.
/// A changed language always yields a new session id.
pub async fn open_chat_session(
    State(state): State<AppState>,
    Json(request): Json<OpenSessionRequest>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let snapshot = state
        .chat_sessions
        .rebind(request.previous_session_id, request.language)
        .await;
    let status = if Some(snapshot.id) == request.previous_session_id {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    (status, Json(snapshot))
}

/// Current transcript of a session
pub async fn get_chat_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionSnapshot>> {
    state
        .chat_sessions
        .snapshot(session_id)
        .await
        .map(Json)
        .ok_or(AppError::SessionNotFound(session_id))
}

pub async fn discard_chat_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.chat_sessions.discard(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound(session_id))
    }
}

/// Send a message and stream the reply as server-sent events
pub async fn send_chat_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    request.validate()?;
    let service = ChatService::new(state.model.clone(), state.chat_sessions.clone());
    let events = service.send_chat_message(session_id, &request.text).await?;
    let stream = events.map(|event| Ok(to_sse_event(&event)));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: &ChatEvent) -> Event {
    match Event::default().event(event.name()).json_data(event) {
        Ok(sse) => sse,
        Err(e) => {
            tracing::error!("Failed to encode chat event: {}", e);
            Event::default().event("failed").data(CHAT_ERROR_MESSAGE)
        }
    }
}
