//! HTTP handlers for the AgroGenius API

pub mod chat;
pub mod health;
pub mod prediction;
pub mod resources;
pub mod speech;
pub mod weather;

pub use chat::{discard_chat_session, get_chat_session, open_chat_session, send_chat_message};
pub use health::health_check;
pub use prediction::{request_crop_image, request_crop_prediction, request_full_prediction};
pub use resources::request_regional_resources;
pub use speech::extract_fields_from_speech;
pub use weather::request_weather;
