//! Schema-constrained request client
//!
//! Every structured call goes through here: the response language is
//! appended to the system instruction, the reply text is trimmed and parsed,
//! and any failure becomes an `ExtractionError` for the calling operation.

use serde::de::DeserializeOwned;
use shared::Language;
use std::sync::Arc;

use crate::error::{ExtractionError, Operation};
use crate::external::{GenerativeModel, ModelError, Schema, StructuredRequest};

#[derive(Clone)]
pub struct StructuredClient {
    model: Arc<dyn GenerativeModel>,
}

impl StructuredClient {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Issue one request constrained to `schema` and parse the reply as `T`.
    /// No retry, no partial result.
    pub async fn generate<T: DeserializeOwned>(
        &self,
        operation: Operation,
        prompt: String,
        system_instruction: &str,
        schema: Schema,
        language: Language,
    ) -> Result<T, ExtractionError> {
        let request = StructuredRequest {
            system_instruction: with_response_language(system_instruction, language),
            prompt,
            schema,
        };

        tracing::debug!(%operation, %language, "Requesting structured output");

        let result = match self.model.generate_structured(&request).await {
            Ok(text) => parse_structured::<T>(&text),
            Err(e) => Err(e),
        };

        result.map_err(|source| {
            tracing::warn!(%operation, error = %source, "Structured request failed");
            ExtractionError::new(operation, source)
        })
    }
}

/// Append the response-language sentence every instruction must carry
pub fn with_response_language(system_instruction: &str, language: Language) -> String {
    format!(
        "{} The response language should be {}.",
        system_instruction.trim_end(),
        language.code()
    )
}

/// Trim the reply and parse it; missing required keys are a schema violation
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, ModelError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ModelError::SchemaViolation("empty response text".to_string()));
    }
    serde_json::from_str(trimmed)
        .map_err(|e| ModelError::SchemaViolation(format!("Failed to parse response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reading {
        temperature: String,
    }

    #[test]
    fn test_language_sentence_appended() {
        assert_eq!(
            with_response_language("You are a weather data provider. ", Language::Hindi),
            "You are a weather data provider. The response language should be hi."
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let parsed: Reading = parse_structured("\n  {\"temperature\": \"21\"}  \n").unwrap();
        assert_eq!(parsed.temperature, "21");
    }

    #[test]
    fn test_parse_failures_are_schema_violations() {
        for text in ["", "   ", "not json", "{\"humidity\": \"80\"}", "[1, 2]"] {
            assert!(
                matches!(parse_structured::<Reading>(text), Err(ModelError::SchemaViolation(_))),
                "expected schema violation for {:?}",
                text
            );
        }
    }
}
