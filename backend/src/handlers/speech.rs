//! HTTP handlers for voice transcript extraction

use axum::{extract::State, Json};
use serde::Deserialize;
use shared::{Language, PartialAgronomicInput};
use validator::Validate;

use crate::error::AppResult;
use crate::services::SpeechService;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SpeechRequest {
    #[validate(length(max = 4000))]
    pub transcript: String,
    pub language: Language,
}

/// Only the fields mentioned in speech are returned; the UI merges them
/// into its form state.
pub async fn extract_fields_from_speech(
    State(state): State<AppState>,
    Json(request): Json<SpeechRequest>,
) -> AppResult<Json<PartialAgronomicInput>> {
    request.validate()?;
    let service = SpeechService::new(state.model.clone());
    let partial = service
        .extract_fields_from_speech(&request.transcript, request.language)
        .await?;
    Ok(Json(partial))
}
