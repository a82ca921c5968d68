//! Voice transcript extraction
//!
//! The schema lists all seven fields without a `required` set and the
//! instruction asks the model to omit anything not spoken, so the reply is
//! treated as a genuinely partial map.

use shared::{validate_non_empty, AgronomicField, Language, PartialAgronomicInput};
use std::sync::Arc;

use crate::error::{AppResult, Operation};
use crate::external::{GenerativeModel, Schema};
use crate::services::structured::StructuredClient;

const SPEECH_INSTRUCTION: &str = "You are an expert at parsing unstructured text into structured data. Extract the values for N, P, K, temperature, humidity, ph, and rainfall from the user's voice transcript. Ignore units. If a value is not mentioned, omit the key. Respond ONLY with a valid JSON object.";

#[derive(Clone)]
pub struct SpeechService {
    client: StructuredClient,
}

impl SpeechService {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            client: StructuredClient::new(model),
        }
    }

    /// Extract the agronomic fields mentioned in a transcript
    pub async fn extract_fields_from_speech(
        &self,
        transcript: &str,
        language: Language,
    ) -> AppResult<PartialAgronomicInput> {
        validate_non_empty("transcript", transcript)?;

        let prompt = format!("Transcript: \"{}\"", transcript.trim());
        let partial: PartialAgronomicInput = self
            .client
            .generate(
                Operation::SpeechExtraction,
                prompt,
                SPEECH_INSTRUCTION,
                speech_schema(),
                language,
            )
            .await?;

        tracing::debug!(
            fields = ?partial.mentioned_fields(),
            "Extracted fields from transcript"
        );
        Ok(partial)
    }
}

pub fn speech_schema() -> Schema {
    AgronomicField::ALL
        .into_iter()
        .fold(Schema::object(), |schema, field| {
            schema.property(field.key(), Schema::string())
        })
}
