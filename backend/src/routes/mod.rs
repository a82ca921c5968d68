//! Route definitions for the AgroGenius API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Crop prediction and images
        .nest("/predictions", prediction_routes())
        .route("/crop-images", post(handlers::request_crop_image))
        // Form assistance
        .route("/weather", post(handlers::request_weather))
        .route("/speech/extract", post(handlers::extract_fields_from_speech))
        // Subsidies and markets
        .route(
            "/regional-resources",
            post(handlers::request_regional_resources),
        )
        // Chat sessions
        .nest("/chat", chat_routes())
}

/// Crop prediction routes
fn prediction_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::request_crop_prediction))
        .route("/full", post(handlers::request_full_prediction))
}

/// Chat session routes
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(handlers::open_chat_session))
        .route(
            "/sessions/:session_id",
            get(handlers::get_chat_session).delete(handlers::discard_chat_session),
        )
        .route(
            "/sessions/:session_id/messages",
            post(handlers::send_chat_message),
        )
}
