//! HTTP handlers for weather lookup

use axum::{extract::State, Json};
use serde::Deserialize;
use shared::{GeoCoordinate, Language, WeatherReading};

use crate::error::AppResult;
use crate::services::WeatherService;
use crate::AppState;

/// Coordinates plus response language
#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub language: Language,
}

impl LocationRequest {
    pub fn coordinate(&self) -> GeoCoordinate {
        GeoCoordinate::new(self.latitude, self.longitude)
    }
}

/// Current weather at the device location, for pre-filling the form
pub async fn request_weather(
    State(state): State<AppState>,
    Json(request): Json<LocationRequest>,
) -> AppResult<Json<WeatherReading>> {
    let service = WeatherService::new(state.model.clone());
    let reading = service
        .request_weather(&request.coordinate(), request.language)
        .await?;
    Ok(Json(reading))
}
