//! AgroGenius backend
//!
//! AI orchestration for farmers: crop prediction, weather and speech
//! extraction for the prediction form, regional subsidies and markets, crop
//! images, and a streaming agronomy chat, all backed by a hosted
//! generative model.

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult, ExtractionError, Operation};

use external::GenerativeModel;
use services::ChatSessionStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub model: Arc<dyn GenerativeModel>,
    pub chat_sessions: ChatSessionStore,
}

impl AppState {
    pub fn new(config: Config, model: Arc<dyn GenerativeModel>) -> Self {
        let session_ttl = Duration::from_secs(config.chat.session_ttl_secs);
        Self {
            config: Arc::new(config),
            model,
            chat_sessions: ChatSessionStore::with_ttl(session_ttl),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "AgroGenius API v1.0"
}
