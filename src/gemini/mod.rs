pub mod client;

pub use client::GeminiClient;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};

use crate::diagnosis::ResponseSchema;

/// Image bytes sent inline with the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 (standard alphabet, padded).
    pub data: String,
}

impl InlineImage {
    pub fn encode(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// One multimodal request: a text instruction plus one image, optionally constrained by a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisRequest {
    pub prompt: String,
    pub image: InlineImage,
    pub response_schema: Option<ResponseSchema>,
}

/// The external generative model, treated as a black box.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Run the request and return the first candidate's first text part.
    async fn generate(&self, request: DiagnosisRequest) -> anyhow::Result<String>;

    fn model_name(&self) -> &str;
}
