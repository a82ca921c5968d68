//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub text_model: String,
    pub image_model: String,
    pub chat_sessions: usize,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        text_model: state.config.gemini.text_model.clone(),
        image_model: state.config.gemini.image_model.clone(),
        chat_sessions: state.chat_sessions.len().await,
    })
}
