//! External API integrations

pub mod gemini;
pub mod model;
pub mod schema;
pub mod sse;

pub use gemini::GeminiClient;
pub use model::{
    ChatRequest, FragmentStream, GeneratedImage, GenerativeModel, ImageRequest, ModelError, Role,
    StructuredRequest, Turn,
};
pub use schema::{Schema, SchemaType};
