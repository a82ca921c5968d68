//! Configuration management for the AgroGenius server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with AGRO_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Generative model API configuration
    pub gemini: GeminiConfig,

    /// Crop image generation and fallback
    pub images: ImageConfig,

    /// Chat session lifetime
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// API key sent with every model request
    pub api_key: String,

    /// REST base URL, without trailing slash
    pub base_url: String,

    /// Model used for structured extraction and chat
    pub text_model: String,

    /// Model used for crop photographs
    pub image_model: String,

    /// Optional HTTP timeout in seconds. Unset means no timeout.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageConfig {
    /// Placeholder service base; the crop name is appended as a seed segment
    pub fallback_base_url: String,

    /// Placeholder width in pixels
    pub width: u32,

    /// Placeholder height in pixels
    pub height: u32,

    /// Aspect ratio requested from the image model
    pub aspect_ratio: String,

    /// MIME type requested from the image model
    pub mime_type: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Idle sessions untouched for longer than this are evicted
    pub session_ttl_secs: u64,

    /// How often the background sweeper runs
    pub sweep_interval_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("AGRO_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("gemini.base_url", DEFAULT_GEMINI_BASE_URL)?
            .set_default("gemini.text_model", DEFAULT_TEXT_MODEL)?
            .set_default("gemini.image_model", DEFAULT_IMAGE_MODEL)?
            .set_default("images.fallback_base_url", DEFAULT_FALLBACK_BASE_URL)?
            .set_default("images.width", 1200)?
            .set_default("images.height", 675)?
            .set_default("images.aspect_ratio", "16:9")?
            .set_default("images.mime_type", "image/jpeg")?
            .set_default("chat.session_ttl_secs", DEFAULT_SESSION_TTL_SECS)?
            .set_default("chat.sweep_interval_secs", DEFAULT_SWEEP_INTERVAL_SECS)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AGRO_ prefix)
            .add_source(
                Environment::with_prefix("AGRO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_FALLBACK_BASE_URL: &str = "https://picsum.photos/seed";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            fallback_base_url: DEFAULT_FALLBACK_BASE_URL.to_string(),
            width: 1200,
            height: 675,
            aspect_ratio: "16:9".to_string(),
            mime_type: "image/jpeg".to_string(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_hosted_models() {
        let config = Config::default();
        assert_eq!(config.gemini.text_model, "gemini-2.5-flash");
        assert_eq!(config.gemini.image_model, "imagen-4.0-generate-001");
        assert!(config.gemini.request_timeout_secs.is_none());
        assert_eq!(config.images.width, 1200);
        assert_eq!(config.images.height, 675);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.chat.session_ttl_secs, 1800);
        assert_eq!(config.chat.sweep_interval_secs, 60);
    }
}
