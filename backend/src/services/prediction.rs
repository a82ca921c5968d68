//! Crop prediction service

use shared::{validate_agronomic_input, AgronomicInput, Language, PredictionFields, PredictionResult};
use std::sync::Arc;

use crate::error::{AppError, AppResult, Operation};
use crate::external::{GenerativeModel, Schema};
use crate::services::imagery::ImageService;
use crate::services::structured::StructuredClient;

const PREDICTION_INSTRUCTION: &str = "You are an expert agricultural advisor. Based on the provided soil and climate data, suggest the best crop to grow. Predict its yield, estimate the profit, and provide a brief description. Respond ONLY with a valid JSON object matching the provided schema.";

/// Crop prediction service
#[derive(Clone)]
pub struct PredictionService {
    client: StructuredClient,
}

impl PredictionService {
    /// Create a new PredictionService instance
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            client: StructuredClient::new(model),
        }
    }

    /// Suggest a crop for a fully populated input
    pub async fn request_crop_prediction(
        &self,
        input: &AgronomicInput,
        language: Language,
    ) -> AppResult<PredictionFields> {
        validate_agronomic_input(input)?;

        let farm_data = serde_json::to_string(input)
            .map_err(|e| AppError::Internal(format!("Failed to serialize input: {}", e)))?;
        let prompt = format!(
            "Here is the farm data: {}. Provide a crop suggestion.",
            farm_data
        );

        let fields: PredictionFields = self
            .client
            .generate(
                Operation::CropPrediction,
                prompt,
                PREDICTION_INSTRUCTION,
                prediction_schema(),
                language,
            )
            .await?;

        tracing::info!(crop = %fields.crop_name, "Crop prediction received");
        Ok(fields)
    }

    /// Prediction followed by an image of the suggested crop
    pub async fn request_full_prediction(
        &self,
        images: &ImageService,
        input: &AgronomicInput,
        language: Language,
    ) -> AppResult<PredictionResult> {
        let fields = self.request_crop_prediction(input, language).await?;
        let crop_image = images.request_crop_image(&fields.crop_name).await;
        Ok(PredictionResult { fields, crop_image })
    }
}

/// Output schema for a crop suggestion; all five fields required
pub fn prediction_schema() -> Schema {
    Schema::object()
        .property(
            "cropName",
            Schema::string().describe("The common name of the suggested crop."),
        )
        .property(
            "reasoning",
            Schema::string().describe("A brief explanation for why this crop is suitable."),
        )
        .property(
            "predictedYield",
            Schema::string().describe("The estimated yield in kilograms per hectare (kg/ha)."),
        )
        .property(
            "estimatedProfit",
            Schema::string()
                .describe("A rough estimate of the potential profit in USD per hectare."),
        )
        .property(
            "cropDescription",
            Schema::string().describe("A short, engaging description of the crop."),
        )
        .require_all()
}
