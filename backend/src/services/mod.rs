//! AI orchestration services for the AgroGenius platform

pub mod chat;
pub mod imagery;
pub mod prediction;
pub mod resources;
pub mod speech;
pub mod structured;
pub mod weather;

pub use chat::{ChatEvent, ChatService, ChatSession, ChatSessionStore, SessionId, SessionSnapshot};
pub use imagery::ImageService;
pub use prediction::PredictionService;
pub use resources::RegionalResourceService;
pub use speech::SpeechService;
pub use structured::StructuredClient;
pub use weather::WeatherService;
