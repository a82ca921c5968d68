//! Crop image generation with a deterministic placeholder fallback

use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use shared::ImageRef;
use std::sync::Arc;

use crate::config::ImageConfig;
use crate::external::{GenerativeModel, ImageRequest, ModelError};

/// Longest crop name passed to the image model
const MAX_PROMPT_NAME_CHARS: usize = 200;

/// Characters `encodeURIComponent` leaves as they are
const SEED_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Clone)]
pub struct ImageService {
    model: Arc<dyn GenerativeModel>,
    config: ImageConfig,
}

impl ImageService {
    pub fn new(model: Arc<dyn GenerativeModel>, config: ImageConfig) -> Self {
        Self { model, config }
    }

    /// Always resolves to a displayable image; failures fall back to a
    /// placeholder keyed by the crop name.
    pub async fn request_crop_image(&self, crop_name: &str) -> ImageRef {
        if crop_name.trim().is_empty() {
            return ImageRef::Placeholder {
                url: fallback_image_url(&self.config, crop_name),
            };
        }
        match self.generate(crop_name).await {
            Ok(url) => ImageRef::Generated { url },
            Err(e) => {
                tracing::warn!(crop = %crop_name, error = %e, "Crop image generation failed, using placeholder");
                ImageRef::Placeholder {
                    url: fallback_image_url(&self.config, crop_name),
                }
            }
        }
    }

    async fn generate(&self, crop_name: &str) -> Result<String, ModelError> {
        let request = ImageRequest {
            prompt: crop_image_prompt(&prompt_name(crop_name)),
            number_of_images: 1,
            mime_type: self.config.mime_type.clone(),
            aspect_ratio: self.config.aspect_ratio.clone(),
        };

        let images = self.model.generate_images(&request).await?;
        let image = images
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::NoResultAvailable("No image was generated.".to_string()))?;

        let bytes = image.bytes_base64.trim();
        if bytes.is_empty() || STANDARD.decode(bytes).is_err() {
            return Err(ModelError::SchemaViolation(
                "image payload is not valid base64".to_string(),
            ));
        }

        let mime_type = image.mime_type.as_deref().unwrap_or(&self.config.mime_type);
        Ok(format!("data:{};base64,{}", mime_type, bytes))
    }
}

pub fn crop_image_prompt(crop_name: &str) -> String {
    format!(
        "A vibrant, high-quality photograph of a healthy {} plant in a flourishing field, under a clear sunny sky. Realistic photo.",
        crop_name
    )
}

fn prompt_name(crop_name: &str) -> String {
    crop_name.trim().chars().take(MAX_PROMPT_NAME_CHARS).collect()
}

/// Placeholder URL as a pure function of the crop name
pub fn fallback_image_url(config: &ImageConfig, crop_name: &str) -> String {
    let seed = match crop_name.trim() {
        "" => "crop",
        name => name,
    };
    format!(
        "{}/{}/{}/{}",
        config.fallback_base_url.trim_end_matches('/'),
        utf8_percent_encode(seed, SEED_SEGMENT),
        config.width,
        config.height
    )
}
