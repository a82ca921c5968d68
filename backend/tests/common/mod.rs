//! Scripted model double shared by the integration tests

#![allow(dead_code)]

use agrogenius_backend::external::{
    ChatRequest, FragmentStream, GeneratedImage, GenerativeModel, ImageRequest, ModelError,
    StructuredRequest,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays queued replies in order and records every request
#[derive(Default)]
pub struct ScriptedModel {
    structured: Mutex<VecDeque<Result<String, ModelError>>>,
    images: Mutex<VecDeque<Result<Vec<GeneratedImage>, ModelError>>>,
    chats: Mutex<VecDeque<ChatScript>>,
    pub structured_requests: Mutex<Vec<StructuredRequest>>,
    pub image_requests: Mutex<Vec<ImageRequest>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
}

/// How one streamed reply behaves
pub enum ChatScript {
    /// The stream cannot be opened
    Refused(ModelError),
    /// Fragments in order; an `Err` item interrupts the stream
    Fragments(Vec<Result<String, ModelError>>),
}

impl ScriptedModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply_json(&self, json: &str) -> &Self {
        self.structured
            .lock()
            .unwrap()
            .push_back(Ok(json.to_string()));
        self
    }

    pub fn reply_error(&self, error: ModelError) -> &Self {
        self.structured.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn reply_images(&self, result: Result<Vec<GeneratedImage>, ModelError>) -> &Self {
        self.images.lock().unwrap().push_back(result);
        self
    }

    pub fn reply_chat(&self, script: ChatScript) -> &Self {
        self.chats.lock().unwrap().push_back(script);
        self
    }

    pub fn reply_fragments(&self, fragments: &[&str]) -> &Self {
        self.reply_chat(ChatScript::Fragments(
            fragments.iter().map(|f| Ok(f.to_string())).collect(),
        ))
    }

    pub fn structured_calls(&self) -> Vec<StructuredRequest> {
        self.structured_requests.lock().unwrap().clone()
    }

    pub fn image_calls(&self) -> Vec<ImageRequest> {
        self.image_requests.lock().unwrap().clone()
    }

    pub fn chat_calls(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String, ModelError> {
        self.structured_requests
            .lock()
            .unwrap()
            .push(request.clone());
        self.structured
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::TransportFailure("no scripted reply".to_string())))
    }

    async fn generate_images(
        &self,
        request: &ImageRequest,
    ) -> Result<Vec<GeneratedImage>, ModelError> {
        self.image_requests.lock().unwrap().push(request.clone());
        self.images
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::TransportFailure("no scripted image".to_string())))
    }

    async fn stream_chat(&self, request: &ChatRequest) -> Result<FragmentStream, ModelError> {
        self.chat_requests.lock().unwrap().push(request.clone());
        let script = self.chats.lock().unwrap().pop_front();
        match script {
            Some(ChatScript::Fragments(items)) => Ok(Box::pin(futures::stream::iter(items))),
            Some(ChatScript::Refused(e)) => Err(e),
            None => Err(ModelError::TransportFailure("no scripted chat".to_string())),
        }
    }
}

/// The user's example farm record
pub fn sample_input() -> shared::AgronomicInput {
    shared::AgronomicInput {
        nitrogen: "90".to_string(),
        phosphorus: "42".to_string(),
        potassium: "43".to_string(),
        temperature: "20.8".to_string(),
        humidity: "82".to_string(),
        ph: "6.5".to_string(),
        rainfall: "202".to_string(),
    }
}

pub const RICE_PREDICTION: &str = r#"{
    "cropName": "Rice",
    "reasoning": "High humidity and rainfall suit paddy cultivation.",
    "predictedYield": "4500 kg/ha",
    "estimatedProfit": "$850 per hectare",
    "cropDescription": "A staple cereal grown in flooded fields."
}"#;
