//! HTTP handlers for regional subsidies and markets

use axum::{extract::State, Json};
use shared::SubsidiesAndMarkets;

use crate::error::AppResult;
use crate::handlers::weather::LocationRequest;
use crate::services::RegionalResourceService;
use crate::AppState;

pub async fn request_regional_resources(
    State(state): State<AppState>,
    Json(request): Json<LocationRequest>,
) -> AppResult<Json<SubsidiesAndMarkets>> {
    let service = RegionalResourceService::new(state.model.clone());
    let resources = service
        .request_regional_resources(&request.coordinate(), request.language)
        .await?;
    Ok(Json(resources))
}
