//! Gemini REST client
//!
//! Client for the hosted Gemini text and Imagen image models.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::model::{
    ChatRequest, FragmentStream, GeneratedImage, GenerativeModel, ImageRequest, ModelError, Role,
    StructuredRequest, Turn,
};
use super::schema::Schema;
use super::sse::SseDecoder;
use crate::config::GeminiConfig;
use crate::error::{AppError, AppResult};

/// Client for the Gemini API
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

/// Request body for `generateContent` and `streamGenerateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Schema,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }

    fn from_turn(turn: &Turn) -> Self {
        let role = match turn.role {
            Role::User => "user",
            Role::Model => "model",
        };
        Self::text(Some(role), &turn.text)
    }
}

/// Response body of `generateContent`; also each streamed event
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }

    fn missing_text_reason(&self) -> String {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return format!("prompt blocked: {}", reason);
        }
        match self.candidates.first() {
            None => "response contained no candidates".to_string(),
            Some(c) => format!(
                "candidate had no text (finish reason: {})",
                c.finish_reason.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

/// Request body for Imagen `predict`
#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u8,
    output_mime_type: String,
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<ImagePrediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagePrediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: &GeminiConfig) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    /// POST a JSON body and return the response if the status is a success
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, ModelError> {
        let response = self
            .http_client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ModelError::TransportFailure(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ModelError::TransportFailure(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

/// Text of one streamed event, `None` when the event carries no text
fn decode_stream_event(data: &str) -> Result<Option<String>, ModelError> {
    let event: GenerateContentResponse = serde_json::from_str(data)
        .map_err(|e| ModelError::SchemaViolation(format!("Malformed stream event: {}", e)))?;
    if let Some(reason) = event
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(ModelError::NoResultAvailable(format!(
            "prompt blocked: {}",
            reason
        )));
    }
    Ok(event.text().filter(|t| !t.is_empty()))
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String, ModelError> {
        tracing::debug!(model = %self.text_model, "Issuing structured generation request");

        let body = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), &request.prompt)],
            system_instruction: Some(Content::text(None, &request.system_instruction)),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.schema,
            }),
        };

        let response = self
            .post_json(&self.model_url(&self.text_model, "generateContent"), &body)
            .await?;

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::TransportFailure(format!("Failed to read response: {}", e)))?;

        match result.text() {
            Some(text) => Ok(text),
            None => Err(ModelError::NoResultAvailable(result.missing_text_reason())),
        }
    }

    async fn generate_images(
        &self,
        request: &ImageRequest,
    ) -> Result<Vec<GeneratedImage>, ModelError> {
        tracing::debug!(model = %self.image_model, "Issuing image generation request");

        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: request.prompt.clone(),
            }],
            parameters: PredictParameters {
                sample_count: request.number_of_images,
                output_mime_type: request.mime_type.clone(),
                aspect_ratio: request.aspect_ratio.clone(),
            },
        };

        let response = self
            .post_json(&self.model_url(&self.image_model, "predict"), &body)
            .await?;

        let result: PredictResponse = response
            .json()
            .await
            .map_err(|e| ModelError::TransportFailure(format!("Failed to read response: {}", e)))?;

        Ok(result
            .predictions
            .into_iter()
            .filter_map(|p| {
                p.bytes_base64_encoded.map(|bytes| GeneratedImage {
                    mime_type: p.mime_type,
                    bytes_base64: bytes,
                })
            })
            .collect())
    }

    async fn stream_chat(&self, request: &ChatRequest) -> Result<FragmentStream, ModelError> {
        tracing::debug!(
            model = %self.text_model,
            turns = request.contents.len(),
            "Opening chat stream"
        );

        let body = GenerateContentRequest {
            contents: request.contents.iter().map(Content::from_turn).collect(),
            system_instruction: Some(Content::text(None, &request.system_instruction)),
            generation_config: None,
        };

        let url = format!(
            "{}?alt=sse",
            self.model_url(&self.text_model, "streamGenerateContent")
        );
        let response = self.post_json(&url, &body).await?;
        let mut bytes = Box::pin(response.bytes_stream());

        let fragments = async_stream::stream! {
            let mut decoder = SseDecoder::default();
            loop {
                let (events, finished) = match bytes.next().await {
                    Some(Ok(chunk)) => (decoder.push(&chunk), false),
                    Some(Err(e)) => {
                        yield Err(ModelError::TransportFailure(format!("Stream interrupted: {}", e)));
                        return;
                    }
                    None => (decoder.finish().into_iter().collect::<Vec<_>>(), true),
                };
                for data in events {
                    match decode_stream_event(&data) {
                        Ok(Some(text)) => yield Ok(text),
                        Ok(None) => {}
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
                if finished {
                    return;
                }
            }
        };

        Ok(Box::pin(fragments))
    }
}
