//! HTTP handlers for crop prediction and crop images

use axum::{extract::State, Json};
use serde::Deserialize;
use shared::{AgronomicInput, ImageRef, Language, PredictionFields, PredictionResult};

use crate::error::AppResult;
use crate::services::{ImageService, PredictionService};
use crate::AppState;

/// Body for prediction requests
#[derive(Debug, Deserialize)]
pub struct PredictionRequest {
    pub input: AgronomicInput,
    pub language: Language,
}

/// Body for crop image requests
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropImageRequest {
    #[serde(default)]
    pub crop_name: String,
}

/// Suggest a crop for the submitted soil and climate data
pub async fn request_crop_prediction(
    State(state): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> AppResult<Json<PredictionFields>> {
    let service = PredictionService::new(state.model.clone());
    let fields = service
        .request_crop_prediction(&request.input, request.language)
        .await?;
    Ok(Json(fields))
}

/// Suggest a crop and attach a generated or placeholder image
pub async fn request_full_prediction(
    State(state): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> AppResult<Json<PredictionResult>> {
    let service = PredictionService::new(state.model.clone());
    let images = ImageService::new(state.model.clone(), state.config.images.clone());
    let result = service
        .request_full_prediction(&images, &request.input, request.language)
        .await?;
    Ok(Json(result))
}

/// Image for a crop name; any name, including a blank one, gets an image
pub async fn request_crop_image(
    State(state): State<AppState>,
    Json(request): Json<CropImageRequest>,
) -> Json<ImageRef> {
    let images = ImageService::new(state.model.clone(), state.config.images.clone());
    Json(images.request_crop_image(&request.crop_name).await)
}
