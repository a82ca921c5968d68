//! Crop prediction and crop image tests
//!
//! Tests for the prediction flow including:
//! - The example farm record reaching the model serialized exactly once
//! - All five prediction fields being required
//! - Image generation falling back to a stable placeholder

mod common;

use agrogenius_backend::config::ImageConfig;
use agrogenius_backend::external::{GeneratedImage, ModelError};
use agrogenius_backend::services::{ImageService, PredictionService};
use agrogenius_backend::{AppError, Operation};
use common::{sample_input, ScriptedModel, RICE_PREDICTION};
use proptest::prelude::*;
use shared::{ImageRef, InputValidationError, Language};

// ============================================================================
// Prediction
// ============================================================================

#[tokio::test]
async fn test_example_input_is_sent_once_and_parsed() {
    let model = ScriptedModel::new();
    model.reply_json(RICE_PREDICTION);
    let service = PredictionService::new(model.clone());

    let fields = service
        .request_crop_prediction(&sample_input(), Language::English)
        .await
        .unwrap();

    assert_eq!(fields.crop_name, "Rice");
    assert_eq!(fields.predicted_yield, "4500 kg/ha");

    let calls = model.structured_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].prompt,
        r#"Here is the farm data: {"N":"90","P":"42","K":"43","temperature":"20.8","humidity":"82","ph":"6.5","rainfall":"202"}. Provide a crop suggestion."#
    );
    assert_eq!(
        calls[0].schema.required_keys(),
        [
            "cropName",
            "reasoning",
            "predictedYield",
            "estimatedProfit",
            "cropDescription"
        ]
    );
}

#[tokio::test]
async fn test_language_is_threaded_into_instruction() {
    let model = ScriptedModel::new();
    model.reply_json(RICE_PREDICTION);
    let service = PredictionService::new(model.clone());

    service
        .request_crop_prediction(&sample_input(), Language::Bengali)
        .await
        .unwrap();

    let instruction = &model.structured_calls()[0].system_instruction;
    assert!(instruction.starts_with("You are an expert agricultural advisor."));
    assert!(instruction.ends_with("The response language should be bn."));
}

#[tokio::test]
async fn test_missing_prediction_field_is_extraction_error() {
    let model = ScriptedModel::new();
    model.reply_json(
        r#"{"cropName":"Maize","reasoning":"Warm","predictedYield":"3000 kg/ha","estimatedProfit":"$500"}"#,
    );
    let service = PredictionService::new(model.clone());

    let err = service
        .request_crop_prediction(&sample_input(), Language::English)
        .await
        .unwrap_err();

    match err {
        AppError::Extraction(e) => {
            assert_eq!(e.operation, Operation::CropPrediction);
            assert!(matches!(e.source, ModelError::SchemaViolation(_)));
        }
        other => panic!("expected extraction error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transport_failure_is_extraction_error() {
    let model = ScriptedModel::new();
    model.reply_error(ModelError::TransportFailure("API returned 503".to_string()));
    let service = PredictionService::new(model.clone());

    let err = service
        .request_crop_prediction(&sample_input(), Language::English)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Extraction(ref e) if matches!(e.source, ModelError::TransportFailure(_))
    ));
}

#[tokio::test]
async fn test_incomplete_input_never_reaches_model() {
    let model = ScriptedModel::new();
    let service = PredictionService::new(model.clone());
    let mut input = sample_input();
    input.humidity.clear();

    let err = service
        .request_crop_prediction(&input, Language::English)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::InvalidInput(InputValidationError::MissingFields(_))
    ));
    assert!(model.structured_calls().is_empty());
}

#[tokio::test]
async fn test_full_prediction_requests_image_for_returned_crop() {
    let model = ScriptedModel::new();
    model.reply_json(RICE_PREDICTION).reply_images(Ok(vec![GeneratedImage {
        mime_type: Some("image/jpeg".to_string()),
        bytes_base64: "aGVsbG8=".to_string(),
    }]));
    let service = PredictionService::new(model.clone());
    let images = ImageService::new(model.clone(), ImageConfig::default());

    let result = service
        .request_full_prediction(&images, &sample_input(), Language::English)
        .await
        .unwrap();

    assert_eq!(result.fields.crop_name, "Rice");
    assert_eq!(
        result.crop_image,
        ImageRef::Generated {
            url: "data:image/jpeg;base64,aGVsbG8=".to_string()
        }
    );
    assert!(model.image_calls()[0].prompt.contains("healthy Rice plant"));
}

// ============================================================================
// Crop images
// ============================================================================

#[tokio::test]
async fn test_image_request_parameters() {
    let model = ScriptedModel::new();
    model.reply_images(Ok(vec![GeneratedImage {
        mime_type: None,
        bytes_base64: "aGVsbG8=".to_string(),
    }]));
    let images = ImageService::new(model.clone(), ImageConfig::default());

    let image = images.request_crop_image("Cotton").await;

    assert_eq!(image.url(), "data:image/jpeg;base64,aGVsbG8=");
    let request = &model.image_calls()[0];
    assert_eq!(request.number_of_images, 1);
    assert_eq!(request.mime_type, "image/jpeg");
    assert_eq!(request.aspect_ratio, "16:9");
}

#[tokio::test]
async fn test_zero_images_falls_back_to_placeholder() {
    let model = ScriptedModel::new();
    model.reply_images(Ok(Vec::new()));
    let images = ImageService::new(model.clone(), ImageConfig::default());

    let image = images.request_crop_image("Sugarcane").await;

    assert_eq!(
        image,
        ImageRef::Placeholder {
            url: "https://picsum.photos/seed/Sugarcane/1200/675".to_string()
        }
    );
}

#[tokio::test]
async fn test_invalid_image_payload_falls_back() {
    let model = ScriptedModel::new();
    model.reply_images(Ok(vec![GeneratedImage {
        mime_type: Some("image/jpeg".to_string()),
        bytes_base64: "%%% not base64 %%%".to_string(),
    }]));
    let images = ImageService::new(model.clone(), ImageConfig::default());

    assert!(images.request_crop_image("Barley").await.is_placeholder());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Generation failure twice for the same crop yields the same placeholder
    #[test]
    fn property_fallback_is_deterministic(crop_name in "\\PC{0,40}") {
        let model = ScriptedModel::new();
        model
            .reply_images(Err(ModelError::TransportFailure("down".to_string())))
            .reply_images(Err(ModelError::NoResultAvailable("none".to_string())));
        let images = ImageService::new(model.clone(), ImageConfig::default());

        let first = tokio_test::block_on(images.request_crop_image(&crop_name));
        let second = tokio_test::block_on(images.request_crop_image(&crop_name));

        prop_assert!(first.is_placeholder());
        prop_assert_eq!(first, second);
    }
}
