//! Provider-neutral interface to the hosted generative model

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::schema::Schema;

/// Failures at the model boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Network failure, non-success status, or unreadable body
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Response text is not JSON of the expected shape
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// The model answered but produced nothing usable
    #[error("No result available: {0}")]
    NoResultAvailable(String),
}

/// One request whose reply must be JSON matching `schema`
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub schema: Schema,
}

/// Request for generated photographs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub number_of_images: u8,
    pub mime_type: String,
    pub aspect_ratio: String,
}

/// A generated image as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: Option<String>,
    pub bytes_base64: String,
}

/// Speaker of a conversation turn as the model sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A completed conversation turn kept as model context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// A streamed chat request; `contents` ends with the new user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub system_instruction: String,
    pub contents: Vec<Turn>,
}

/// Ordered, finite text fragments of a streamed reply
pub type FragmentStream = BoxStream<'static, Result<String, ModelError>>;

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Issue a schema-constrained request and return the raw reply text
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String, ModelError>;

    /// Generate images; an empty vector means the model produced none
    async fn generate_images(&self, request: &ImageRequest)
        -> Result<Vec<GeneratedImage>, ModelError>;

    /// Start a streamed chat reply
    async fn stream_chat(&self, request: &ChatRequest) -> Result<FragmentStream, ModelError>;
}
