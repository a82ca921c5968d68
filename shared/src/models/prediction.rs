//! Crop prediction results

use serde::{Deserialize, Serialize};

/// Free-text fields produced by the model for a crop suggestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionFields {
    pub crop_name: String,
    pub reasoning: String,
    pub predicted_yield: String,
    pub estimated_profit: String,
    pub crop_description: String,
}

/// A displayable image reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    /// Inline `data:` URL holding the generated image
    Generated { url: String },
    /// Stable placeholder derived from the crop name
    Placeholder { url: String },
}

impl ImageRef {
    pub fn url(&self) -> &str {
        match self {
            ImageRef::Generated { url } | ImageRef::Placeholder { url } => url,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ImageRef::Placeholder { .. })
    }
}

/// Prediction fields plus the crop image attached after generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    #[serde(flatten)]
    pub fields: PredictionFields,
    pub crop_image: ImageRef,
}
